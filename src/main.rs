use std::{env, process::ExitCode};

use triangle_solver::{
    dbg_figure, dbg_triangle, Point, SolverEvent, Tolerances, TriangleSet,
    Workspace,
};

const USAGE: &str = "usage: triangle_solver [FILE.ts] [--save PATH] [--canvas]";

/// A triangle with one median drawn, giving three triangles in total.
fn demo(workspace: &Workspace) -> Result<(), triangle_solver::FigureErr> {
    let (a, b, c) = (
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(5.0, 10.0),
    );
    workspace.insert_segment(a, b)?;
    workspace.insert_segment(b, c)?;
    workspace.insert_segment(c, a)?;
    workspace.insert_segment(c, Point::new(5.0, 0.0))?;
    Ok(())
}

struct Args {
    input: Option<String>,
    save: Option<String>,
    /// Pixel-scale snapping, for figures drawn in an editor.
    canvas: bool,
}

fn parse_args() -> Option<Args> {
    let mut args = Args {
        input: None,
        save: None,
        canvas: false,
    };
    let mut rest = env::args().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--save" => args.save = Some(rest.next()?),
            "--canvas" => args.canvas = true,
            "-h" | "--help" => return None,
            _ if args.input.is_none() => args.input = Some(arg),
            _ => return None,
        }
    }
    Some(args)
}

pub fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::INFO)
        .init();

    let Some(args) = parse_args() else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    let tolerances = if args.canvas {
        Tolerances::canvas()
    } else {
        Tolerances::default()
    };
    let mut workspace = Workspace::new(tolerances);
    let prepared = match &args.input {
        Some(path) => workspace.load(path),
        None => demo(&workspace),
    };
    if let Err(err) = prepared {
        eprintln!("could not prepare figure: {}", err);
        return ExitCode::FAILURE;
    }
    if let Some(path) = &args.save {
        match workspace.save(path) {
            Ok(written) => println!("saved to {}", written.display()),
            Err(err) => {
                eprintln!("could not save figure: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("{:?}", dbg_figure!(&workspace.figure()));

    let mut triangles = TriangleSet::default();
    for event in workspace.lock() {
        match event {
            SolverEvent::Triangle { triangle, .. } => {
                triangles.insert(triangle);
            }
            SolverEvent::Finished { total } => {
                println!("{} triangle(s)", total);
                break;
            }
            SolverEvent::Cancelled => break,
            SolverEvent::Progress(_) => {}
        }
    }

    let figure = workspace.figure();
    for triangle in &triangles {
        println!("{:?}", dbg_triangle!(&figure, triangle));
    }
    ExitCode::SUCCESS
}
