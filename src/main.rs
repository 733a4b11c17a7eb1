//! Writes the text mask of every given image, falling back to the original image if no mask can
//! be made.

use clap::{arg, value_parser, Command};
use std::path::{Path, PathBuf};
use text_mask::config::{load_config, MaskConfig};
use text_mask::image_support::{alpha_preview, load_raster, raster_to_rgba_image, save_raster};
use text_mask::util::{write_mask_html, MaskEntry};
use text_mask::{MaskPipeline, Raster};

fn output_path(output_dir: &Path, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"));
    output_dir.join(format!("{stem}_{suffix}.png"))
}

fn save_alpha(mask: &Raster, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = raster_to_rgba_image(mask)?;
    alpha_preview(&image).save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = Command::new("text_mask")
        .about("Keeps the text of an image in its own color, everything else becomes transparent.")
        .arg(
            arg!(<INPUT> ... "Images to process.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"output-dir" <PATH> "Directory to write the masks to.")
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            arg!(--config <FILE> "Pipeline configuration, json or yaml.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--report "Print a json report for every image."))
        .arg(arg!(--"save-alpha" "Also write the alpha channel of every mask as a gray image."))
        .arg(
            arg!(--html <FILE> "Write a page showing every original above its mask.")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => load_config(path)?,
        None => MaskConfig::default(),
    };
    log::debug!("using configuration {config:?}");
    let pipeline = MaskPipeline::new(config);

    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .expect("has a default");
    std::fs::create_dir_all(output_dir)?;

    let print_report = matches.get_flag("report");
    let write_alpha = matches.get_flag("save-alpha");

    let mut entries: Vec<MaskEntry> = vec![];
    for input in matches
        .get_many::<PathBuf>("INPUT")
        .expect("input is required")
    {
        let raster = match load_raster(input) {
            Ok(raster) => raster,
            Err(e) => {
                log::error!("could not load {input:?}: {e}");
                continue;
            }
        };

        let mask_path = output_path(output_dir, input, "mask");
        let report = match pipeline.run_with_report(&raster) {
            Ok((mask, report)) => {
                save_raster(&mask, &mask_path)?;
                if write_alpha {
                    save_alpha(&mask, &output_path(output_dir, input, "alpha"))?;
                }
                log::info!("{input:?}: {:?} background -> {mask_path:?}", report.polarity);
                Some(report)
            }
            Err(e) => {
                log::warn!("{input:?}: {e}, writing the original image");
                save_raster(&raster, &mask_path)?;
                None
            }
        };

        let entry = MaskEntry {
            original: input.clone(),
            mask: mask_path,
            report,
        };
        if print_report {
            println!("{}", serde_json::to_string(&entry)?);
        }
        entries.push(entry);
    }

    if let Some(html) = matches.get_one::<PathBuf>("html") {
        write_mask_html(&entries, html)?;
        println!("Wrote {}", html.display());
    }
    Ok(())
}
