use anyhow::Result;

#[cfg(feature = "cli")]
mod main {
    use super::*;
    use anyhow::bail;
    use clap::{Parser, Subcommand};
    use nebula::{
        config::NebulaConfig,
        field::FieldSampling,
        run::{self, RenderOptions},
    };
    use std::{num::NonZeroUsize, path::PathBuf};

    #[derive(Debug, Parser)]
    #[command(about = "Generate and render a procedural volumetric nebula", long_about = None)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Generate the density field and render a frame of it
        Render {
            /// Path to RON configuration file to use
            #[arg(short, long)]
            config: Option<PathBuf>,

            /// Path where the rendered PNG image should be written
            #[arg(short, long, default_value = "nebula.png")]
            output_path: PathBuf,

            /// Path where the raw density field should be written
            #[arg(long)]
            field_output_path: Option<PathBuf>,

            /// Width of the rendered image in pixels
            #[arg(long, default_value_t = 800)]
            width: u32,

            /// Height of the rendered image in pixels
            #[arg(long, default_value_t = 600)]
            height: u32,

            /// Number of milliseconds the nebula has been spinning for
            #[arg(short, long, default_value_t = 0.0)]
            time: f64,

            /// Number of worker threads to use
            #[arg(long)]
            threads: Option<NonZeroUsize>,

            #[command(flatten)]
            overrides: ConfigOverrides,
        },
        /// Generate the default RON configuration file
        GenerateConfig {
            /// Path where the file should be written
            #[arg(short, long)]
            output_path: PathBuf,
            /// Overwrite any existing file at the given path
            #[arg(short, long)]
            force_overwrite: bool,
        },
    }

    /// Options overriding those in the configuration file.
    #[derive(Debug, clap::Args)]
    struct ConfigOverrides {
        /// Number of voxels along each axis of the density field
        #[arg(long)]
        grid_size: Option<usize>,

        /// Seed for the noise permutation table
        #[arg(long)]
        seed: Option<u64>,

        /// Number of noise octaves
        #[arg(long)]
        octaves: Option<u32>,

        /// Opacity multiplier for each sample
        #[arg(long)]
        opacity: Option<f32>,

        /// Number of raymarching steps
        #[arg(long)]
        steps: Option<u32>,

        /// Interpolate density samples trilinearly
        #[arg(long)]
        trilinear: bool,

        /// Disable jittering of ray start positions
        #[arg(long)]
        no_jitter: bool,
    }

    impl ConfigOverrides {
        fn apply(&self, config: &mut NebulaConfig) {
            if let Some(grid_size) = self.grid_size {
                config.field.grid_size = grid_size;
            }
            if self.seed.is_some() {
                config.field.noise.seed = self.seed;
            }
            if let Some(octaves) = self.octaves {
                config.field.noise.octaves = octaves;
            }
            if let Some(opacity) = self.opacity {
                config.raymarching.opacity = opacity;
            }
            if let Some(steps) = self.steps {
                config.raymarching.steps = steps;
            }
            if self.trilinear {
                config.raymarching.sampling = FieldSampling::Trilinear;
            }
            if self.no_jitter {
                config.raymarching.jitter = false;
            }
        }
    }

    pub fn main() -> Result<()> {
        run::init_logging()?;

        let cli = Cli::parse();

        match cli.command {
            Command::Render {
                config,
                output_path,
                field_output_path,
                width,
                height,
                time,
                threads,
                overrides,
            } => {
                if let Some(n_threads) = threads {
                    run::configure_thread_pool(n_threads)?;
                }

                let mut config = match config {
                    Some(file_path) => NebulaConfig::from_ron_file(file_path)?,
                    None => NebulaConfig::default(),
                };
                overrides.apply(&mut config);

                let options = RenderOptions {
                    width,
                    height,
                    time_ms: time,
                    image_output_path: output_path,
                    field_output_path,
                };

                run::run(config, &options)
            }
            Command::GenerateConfig {
                output_path,
                force_overwrite,
            } => {
                if !force_overwrite && output_path.exists() {
                    bail!("File {} already exists", output_path.display());
                }
                NebulaConfig::default().save_ron_file(output_path)
            }
        }
    }
}

#[cfg(not(feature = "cli"))]
mod main {
    use super::*;

    pub fn main() -> Result<()> {
        anyhow::bail!("This binary requires the `cli` feature to be enabled.")
    }
}

fn main() -> Result<()> {
    main::main()
}
