//! Command line arguments backing the `labelsight` binary.
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "labelsight",
  about = "Detect image labels with AWS Rekognition and draw them onto the image",
  version
)]
pub struct Args {
  #[command(flatten)]
  pub global: GlobalArgs,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(ClapArgs, Debug)]
pub struct GlobalArgs {
  /// JSON settings file
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// CSV file holding the access key pair
  #[arg(long, global = true)]
  pub credentials: Option<PathBuf>,

  /// AWS region for the detection call
  #[arg(long, global = true)]
  pub region: Option<String>,

  /// Timeout in seconds for downloads and the detection call
  #[arg(long, global = true)]
  pub timeout: Option<u64>,

  /// Total attempts per detection call, first try included (1 disables retry)
  #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
  pub max_attempts: Option<u32>,

  /// Log debug output
  #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
  pub verbose: bool,

  /// Only log errors
  #[arg(long, short = 'q', global = true)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Print the labels detected in an image
  Labels {
    /// Image URL or local file
    image: String,

    /// Minimum confidence (0-100)
    #[arg(long, short = 'c')]
    confidence: Option<f32>,

    /// Print a JSON label report instead of one name per line
    #[arg(long)]
    json: bool,

    /// Replay labels from a saved report instead of calling the service
    #[arg(long)]
    labels_from: Option<PathBuf>,
  },
  /// Draw the detected labels onto a copy of an image
  Annotate {
    /// Image URL or local file
    image: String,

    /// Minimum confidence (0-100)
    #[arg(long, short = 'c')]
    confidence: Option<f32>,

    /// Output image path
    #[arg(long, short = 'o', default_value = "labelled.png")]
    output: PathBuf,

    /// TTF/OTF font file
    #[arg(long)]
    font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<f32>,

    /// Wrap the label text at this many characters
    #[arg(long)]
    columns: Option<usize>,

    /// Replay labels from a saved report instead of calling the service
    #[arg(long)]
    labels_from: Option<PathBuf>,
  },
  /// Annotate every image in a directory
  Batch {
    /// Directory to scan for images
    dir: PathBuf,

    /// Directory for annotated images and the summary
    #[arg(long, short = 'o', default_value = "labelled")]
    output_dir: PathBuf,

    /// Images processed at the same time
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Minimum confidence (0-100)
    #[arg(long, short = 'c')]
    confidence: Option<f32>,
  },
  /// Annotate the sample image and write labelled.png
  Demo {
    /// Output image path
    #[arg(long, short = 'o', default_value = "labelled.png")]
    output: PathBuf,
  },
}

impl GlobalArgs {
  pub fn log_level(&self) -> log::LevelFilter {
    labelsight::logging::level_for(self.verbose, self.quiet)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn test_args_are_consistent() {
    Args::command().debug_assert();
  }

  #[test]
  fn test_global_flags_after_subcommand() {
    let args = Args::try_parse_from([
      "labelsight",
      "labels",
      "pool.jpg",
      "-c",
      "90",
      "--region",
      "eu-west-1",
      "-v",
    ])
    .unwrap();
    assert_eq!(args.global.region.as_deref(), Some("eu-west-1"));
    assert!(args.global.verbose);
    match args.command {
      Commands::Labels { image, confidence, .. } => {
        assert_eq!(image, "pool.jpg");
        assert_eq!(confidence, Some(90.0));
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn test_max_attempts_counts_the_first_try() {
    let args = Args::try_parse_from(["labelsight", "--max-attempts", "3", "version"]).unwrap();
    assert_eq!(args.global.max_attempts, Some(3));
    assert!(Args::try_parse_from(["labelsight", "--max-attempts", "0", "version"]).is_err());
    assert!(Args::try_parse_from(["labelsight", "--retries", "3", "version"]).is_err());
  }

  #[test]
  fn test_verbose_conflicts_with_quiet() {
    assert!(Args::try_parse_from(["labelsight", "-v", "-q", "version"]).is_err());
  }
}
