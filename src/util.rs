use crate::MaskReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One processed image, as listed on the inspection page.
#[derive(Debug, Clone, Serialize)]
pub struct MaskEntry {
    pub original: PathBuf,
    pub mask: PathBuf,
    /// None if extraction failed and the mask file holds the original.
    pub report: Option<MaskReport>,
}

/// Render the html page body for the provided entries.
pub fn mask_html(entries: &[MaskEntry]) -> String {
    let mut c: String = String::new();
    let mut views: String = String::new();

    for (i, e) in entries.iter().enumerate() {
        views.push_str(&format!(
            r#"<div class="entry" id="entry_{i}" onclick="show({i});">
                    <img class="original" src="{original}" />
                    <img class="mask" src="{mask}" />
                </div>
                "#,
            original = e.original.to_string_lossy(),
            mask = e.mask.to_string_lossy(),
        ));
    }

    c.push_str(
        r##"<!DOCTYPE html>
            <html>
            <head>
                <style>
                .entry {
                    display: inline-flex;
                    flex-direction: column;
                    margin: 10px;
                    cursor: pointer;
                }
                .entry img {
                    max-width: 400px;
                    image-rendering: pixelated;
                }
                .entry .mask {
                    background-color: #ccc;
                    background-image: linear-gradient(45deg, #eee 25%, transparent 25%, transparent 75%, #eee 75%),
                                      linear-gradient(45deg, #eee 25%, transparent 25%, transparent 75%, #eee 75%);
                    background-size: 16px 16px;
                    background-position: 0 0, 8px 8px;
                }
                #message {
                    min-height: 50px;
                    font: 18px serif;
                }
                </style>
            </head>
            <body>
                <script>
            let d = (a) => document.getElementById(a);
            function show(index){
                let entry = entries[index];
                d("message").innerHTML = entry.report === null ? "extraction failed, showing original" : JSON.stringify(entry.report);
            }
            "##,
    );

    c.push_str(&format!(
        r#"const entries = {};
        </script>
        <p id="message">Click an image to show its report here.</p>"#,
        &serde_json::to_string(&entries).unwrap_or_else(|_| String::from("[]"))
    ));

    c.push_str(&views);
    c.push_str("</body></html>");
    c
}

/// Write an html page showing every original above its mask.
pub fn write_mask_html(
    entries: &[MaskEntry],
    out_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(out_path, mask_html(entries))?;
    Ok(())
}
