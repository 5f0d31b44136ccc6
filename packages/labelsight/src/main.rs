mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands, GlobalArgs};
use labelsight::batch::{annotate_directory, BatchOptions};
use labelsight::credentials::CredentialSource;
use labelsight::logging::init_logging;
use labelsight::{ImageSource, LabelReport, Settings};
use std::path::Path;
use std::sync::Arc;

/// Image annotated by `labelsight demo`.
const SAMPLE_IMAGE_URL: &str = "https://www.parrots.org/images/uploads/dreamstime_C_47716185.jpg";

#[tokio::main]
async fn main() {
  let args = Args::parse();
  init_logging(args.global.log_level());

  if let Err(e) = run(args).await {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

async fn run(args: Args) -> Result<()> {
  let mut settings = load_settings(&args.global)?;

  match args.command {
    Commands::Version => {
      println!("labelsight {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Labels {
      image,
      confidence,
      json,
      labels_from,
    } => {
      set_threshold(&mut settings, confidence)?;
      let replay = load_replay(labels_from.as_deref())?;
      let fetcher = settings.fetcher(replay.as_ref()).await?;
      let source = ImageSource::from_reference(&image);
      let threshold = settings.detection.threshold;

      if json {
        let labels = fetcher
          .fetch_labels(&source, threshold)
          .await
          .with_context(|| format!("failed to fetch labels for {}", source))?;
        println!("{}", LabelReport::new(&source, threshold, labels).to_json()?);
      } else {
        let names = fetcher
          .get_labels(&source, threshold)
          .await
          .with_context(|| format!("failed to fetch labels for {}", source))?;
        for name in names {
          println!("{}", name);
        }
      }
    }
    Commands::Annotate {
      image,
      confidence,
      output,
      font,
      font_size,
      columns,
      labels_from,
    } => {
      set_threshold(&mut settings, confidence)?;
      if let Some(font) = font {
        settings.font.path = Some(font);
      }
      if let Some(size) = font_size {
        settings.overlay.font_size = size;
      }
      if let Some(columns) = columns {
        settings.overlay.columns = columns;
      }
      settings.validate()?;

      let replay = load_replay(labels_from.as_deref())?;
      let source = ImageSource::from_reference(&image);
      annotate_one(&settings, replay.as_ref(), &source, &output).await?;
    }
    Commands::Batch {
      dir,
      output_dir,
      jobs,
      confidence,
    } => {
      set_threshold(&mut settings, confidence)?;
      if let Some(jobs) = jobs {
        settings.batch.concurrency = jobs;
      }
      settings.validate()?;

      let annotator = Arc::new(settings.annotator(None).await?);
      let options = BatchOptions {
        input_dir: dir,
        output_dir,
        threshold: settings.detection.threshold,
        concurrency: settings.batch.concurrency,
      };
      let summary = annotate_directory(annotator, &options)
        .await
        .with_context(|| format!("batch annotation of {} failed", options.input_dir.display()))?;

      println!(
        "Annotated {} of {} images into {}",
        summary.annotated,
        summary.total,
        options.output_dir.display()
      );
      if summary.failed > 0 {
        anyhow::bail!("{} images could not be annotated", summary.failed);
      }
    }
    Commands::Demo { output } => {
      let source = ImageSource::from_reference(SAMPLE_IMAGE_URL);
      annotate_one(&settings, None, &source, &output).await?;
    }
  }

  Ok(())
}

fn load_settings(global: &GlobalArgs) -> Result<Settings> {
  let mut settings = match &global.config {
    Some(path) => Settings::load_from_path(path)?,
    None => Settings::default(),
  };

  if let Some(path) = &global.credentials {
    settings.credentials = CredentialSource::CsvFile(path.clone());
  }
  if let Some(region) = &global.region {
    settings.detection.region = Some(region.clone());
  }
  if let Some(timeout) = global.timeout {
    settings.detection.timeout_secs = timeout;
  }
  if let Some(attempts) = global.max_attempts {
    settings.detection.max_attempts = attempts;
  }
  Ok(settings)
}

fn set_threshold(settings: &mut Settings, confidence: Option<f32>) -> Result<()> {
  if let Some(confidence) = confidence {
    settings.detection.threshold = labelsight::validate_threshold(confidence)?;
  }
  Ok(())
}

fn load_replay(path: Option<&Path>) -> Result<Option<LabelReport>> {
  path
    .map(LabelReport::load_from_path)
    .transpose()
    .context("failed to load saved labels")
}

async fn annotate_one(
  settings: &Settings,
  replay: Option<&LabelReport>,
  source: &ImageSource,
  output: &Path,
) -> Result<()> {
  let annotator = settings.annotator(replay).await?;
  let annotated = annotator
    .label_image(source, settings.detection.threshold)
    .await
    .with_context(|| format!("failed to annotate {}", source))?;
  annotated.save(output)?;

  println!("{}", annotated.text);
  println!("Annotated image written to {}", output.display());
  Ok(())
}
