use std::path::PathBuf;

use clap::Parser;
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

use menger_viewer::input::InputMapper;
use menger_viewer::render::RenderContext;
use menger_viewer::scene::Session;
use menger_viewer::sponge::{MengerSponge, MAX_NESTING_LEVEL};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Tessellated Menger sponge viewer")]
struct Args {
    /// Initial window width in pixels
    #[arg(long, short = 'W', default_value_t = 800)]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, short = 'H', default_value_t = 600)]
    height: u32,

    /// Fractal nesting level, 0 to 4
    #[arg(long, short = 'n', default_value_t = 1)]
    nesting_level: u32,

    /// Where Ctrl+S writes the solid mesh
    #[arg(long, default_value = "geometry.obj")]
    export_path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let event_loop = EventLoop::new().unwrap();
    let window = WindowBuilder::new()
        .with_title("Menger")
        .with_inner_size(PhysicalSize::new(args.width, args.height))
        .build(&event_loop)
        .unwrap();

    let mut session = Session::new(Some(Box::new(MengerSponge::new(
        args.nesting_level.min(MAX_NESTING_LEVEL),
    ))));
    // Mirror the starting level into the scene state.
    session.set_nesting_level(args.nesting_level.min(MAX_NESTING_LEVEL));
    let mut mapper = InputMapper::new();
    let mut context = pollster::block_on(RenderContext::new(
        &window,
        &mut session,
        args.export_path,
    ));

    let window = &window;
    event_loop
        .run(move |event, target| {
            if let Event::AboutToWait = event {
                context.render_frame(&mut session);
                window.request_redraw();
            }

            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(code) = event.physical_key {
                            mapper.handle_key(&mut session, code, event.state);
                        }
                        if mapper.take_exit() {
                            target.exit();
                        }
                    }
                    WindowEvent::ModifiersChanged(modifiers) => {
                        mapper.handle_modifiers(modifiers.state().control_key());
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        mapper.handle_cursor(&mut session, position.x as f32, position.y as f32);
                    }
                    WindowEvent::MouseInput { button, state, .. } => {
                        mapper.handle_button(button, state);
                    }
                    WindowEvent::Resized(new_size) => {
                        context.resize(new_size.width, new_size.height);
                        window.request_redraw();
                    }
                    WindowEvent::CloseRequested => target.exit(),
                    _ => {}
                }
            }
        })
        .unwrap();
}
