use clap::{Parser, Subcommand};
use folio::{FolioError, PipelineBuilder, RenderConfig, resource_base};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Render positioned area trees to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON area tree to a PDF file
    Render {
        /// Area tree produced by layout
        tree: PathBuf,
        /// Where to write the PDF
        output: PathBuf,
        /// JSON rendering configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), FolioError> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { tree, output, config } => {
            let config = match config {
                Some(path) => RenderConfig::from_file(path)?,
                None => RenderConfig::default(),
            };
            let pipeline = PipelineBuilder::new()
                .with_config(config)
                .with_resource_dir(resource_base(&tree))
                .build();
            pipeline.generate_to_file(&tree, &output)?;
            println!("Successfully generated {}", output.display());
        }
    }
    Ok(())
}
