//! Headless walkthrough: drives an eye and one scene frame with scripted
//! pointer and keyboard input and logs the resulting poses.
//!
//! Usage: `vantage [options.toml]`. Run with `RUST_LOG=debug` to see the
//! routing decisions.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use vantage::agent::{AnyGrabber, InputHandler, KeyAgent, MotionAgent};
use vantage::event::{Button, Dof1Event, Dof2Event, Key, KeyEvent, Modifiers};
use vantage::eye::Eye;
use vantage::frame::Frame;
use vantage::interactive::InteractiveFrame;
use vantage::options::Options;
use vantage::timing::Tick;
use vantage::VantageError;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const STEP: Tick = 40;

fn load_options() -> Result<Options, VantageError> {
    match std::env::args().nth(1) {
        Some(path) => Options::load(Path::new(&path)),
        None => Ok(Options::default()),
    }
}

fn log_eye(label: &str, eye: &Rc<RefCell<Eye>>) {
    let eye = eye.borrow();
    log::info!(
        "{label}: eye at {:.2} looking {:.2}",
        eye.position(),
        eye.view_direction()
    );
}

fn run(options: &Options) -> Result<(), VantageError> {
    let mut eye = Eye::with_lens(options.eye.lens(WIDTH, HEIGHT));
    options.apply_to_eye(&mut eye);
    let eye = Rc::new(RefCell::new(eye));

    let mut mouse = MotionAgent::new("mouse", Rc::clone(&eye));
    options.apply_to_agent(&mut mouse);
    let mut keyboard = KeyAgent::default();
    options.apply_to_key_agent(&mut keyboard);

    let mut frame = InteractiveFrame::new(Frame::new());
    options.apply_to_frame(&mut frame);
    let frame = Rc::new(RefCell::new(frame));

    let mut handler = InputHandler::new();
    let mouse = handler.register_motion_agent(mouse);
    let _ = handler.add_in_all_agent_pools(&AnyGrabber::interactive(Rc::clone(&frame)));
    log::debug!("{}", handler.info());

    let Some(mouse) = handler.motion_agent_mut(mouse) else {
        return Err(VantageError::InvalidArgument("mouse agent missing".into()));
    };
    let mut now: Tick = 0;

    // Hover the frame at the screen center and scale it with the wheel.
    let _ = mouse.move_pointer(Dof2Event::absolute(400.0, 300.0).at(now));
    let _ = mouse.wheel(Dof1Event::wheel(-2.0).at(now));
    log::info!("frame magnitude: {:.3}", frame.borrow().frame().borrow().magnitude());

    // Move away and spin the eye with a fast left drag.
    now += STEP;
    let _ = mouse.move_pointer(Dof2Event::absolute(100.0, 100.0).at(now));
    let mut x = 100.0;
    let _ = mouse.press(Dof2Event::relative(x, 100.0, 0.0, 0.0).with_id(Button::Left).at(now));
    for _ in 0..5 {
        now += 10;
        x += 30.0;
        let _ = mouse.drag(Dof2Event::relative(x, 100.0, 30.0, 0.0).with_id(Button::Left).at(now));
    }
    let _ = mouse.release(Dof2Event::relative(x, 100.0, 0.0, 0.0).with_id(Button::Left).at(now));
    log_eye("after drag", &eye);

    // The handler ticks every grabber once, the eye included.
    for _ in 0..25 {
        now += STEP;
        handler.update(now);
    }
    log_eye("after spin", &eye);

    // Record the current pose, fit the scene, then play the pose back.
    let record = KeyEvent::new(Modifiers::CTRL, Key::Char('1'));
    let _ = keyboard.handle_on(&record, &mut eye.borrow_mut());
    let _ = keyboard.handle_on(&KeyEvent::new(Modifiers::empty(), Key::Char('S')), &mut eye.borrow_mut());
    log_eye("show all", &eye);
    let _ = keyboard.handle_on(&KeyEvent::new(Modifiers::empty(), Key::Char('1')), &mut eye.borrow_mut());
    for _ in 0..50 {
        now += STEP;
        handler.update(now);
    }
    log_eye("path played", &eye);

    let mut eye = eye.borrow_mut();
    eye.compute_matrices();
    log::info!("view matrix: {:?}", eye.view().to_cols_array());
    log::info!("projection matrix: {:?}", eye.projection().to_cols_array());
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match load_options() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
