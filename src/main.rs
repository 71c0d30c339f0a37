use clap::Parser;
use example_gallery::imaging::RustBackend;
use example_gallery::pipeline::{self, GalleryDirs, Toolchain};
use example_gallery::render::CommandRenderer;
use example_gallery::solver::CommandSolver;
use example_gallery::{config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "example-gallery")]
#[command(about = "Generate the images and rst files for a gallery of solver examples")]
#[command(long_about = "\
Generate the images and rst files for a gallery of solver examples

Every example script under the examples directory is solved, its final
result rendered to a PNG and scaled down to a thumbnail. A Sphinx source
tree mirroring the examples directory is then written next to the output
file: one index page per directory and one page per example.

Layout (for the default --output):

  gallery/
  ├── images/
  │   ├── a-ex1.png                # examples/a/ex1.py
  │   └── thumbnails/
  │       └── a-ex1.png
  └── examples/
      ├── index.rst
      └── a/
          ├── index.rst
          └── ex1.rst

Run 'example-gallery --gen-config' to print a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing examples
    #[arg(short, long, value_name = "DIRECTORY", default_value = "examples")]
    examples_dir: PathBuf,

    /// Directory where to store gallery images [default: <output dir>/images]
    #[arg(short, long, value_name = "DIRECTORY")]
    images_dir: Option<PathBuf>,

    /// Do not (re)generate images and thumbnails
    #[arg(short, long)]
    no_images: bool,

    /// Output file name; its directory becomes the documentation root
    #[arg(short, long, value_name = "OUTPUT_FILENAME", default_value = "gallery/gallery.html")]
    output: PathBuf,

    /// Gallery configuration file (optional)
    #[arg(short, long, value_name = "FILE", default_value = "gallery.toml")]
    config: PathBuf,

    /// Print a stock gallery.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    let dirs = GalleryDirs::resolve(&cli.examples_dir, cli.images_dir.as_deref(), &cli.output)?;

    let (reporter, rx) = output::Reporter::channel();
    let printer = std::thread::spawn(move || {
        for report in rx {
            for line in output::format_report(&report) {
                println!("{}", line);
            }
        }
    });

    let mut toolchain = Toolchain {
        solver: CommandSolver::new(&config.solver),
        renderer: CommandRenderer::new(&config.renderer),
        backend: RustBackend::new(),
    };
    let result = pipeline::run(&dirs, &config, cli.no_images, &mut toolchain, &reporter);

    drop(reporter);
    printer
        .join()
        .map_err(|_| "output thread panicked")?;

    let report = result?;
    println!("{}", output::format_summary(&report.summary()));
    println!("==> Pages written to {}", dirs.rst_dir.display());

    Ok(())
}
