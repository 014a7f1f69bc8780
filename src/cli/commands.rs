//! Command handlers for the commonlib CLI
//!
//! Each handler builds the library component it exercises from the loaded
//! configuration and prints a short human-readable report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::app::bitmap;
use crate::app::client::{HttpClient, HttpRequest};
use crate::app::decoration::{GridSpacing, GridSpacingConfig};
use crate::app::image::{ImageLoader, ImageLoadingListener, ImageSlot, LogListener};
use crate::cli::args::{ConfigAction, ConfigArgs, DirsArgs, FetchArgs, GridArgs, ImageArgs};
use crate::config::{AppConfig, DirsConfigToml};
use crate::constants::LOG_REQUEST_KEY;
use crate::errors::{AppError, Result};

/// Print one line of margins per grid item
pub async fn handle_grid(args: GridArgs) -> Result<()> {
    let spacing = if args.horizontal {
        GridSpacing::horizontal_with_edges(
            args.columns,
            args.first_row,
            args.last_row,
            args.first_col,
            args.last_col,
            args.h_gap,
            args.v_gap,
        )?
    } else {
        GridSpacing::vertical(GridSpacingConfig::with_edges(
            args.columns,
            args.first_row,
            args.last_row,
            args.first_col,
            args.last_col,
            args.h_gap,
            args.v_gap,
        )?)
    };

    info!(
        "Computing {} margins for {} items, {} columns, extent {}",
        if args.horizontal { "horizontal" } else { "vertical" },
        args.items,
        args.columns,
        args.extent
    );

    for line in grid_report(&spacing, args.items, args.extent)? {
        println!("{}", line);
    }
    Ok(())
}

/// Margin lines for every item, followed by the resulting item extent
fn grid_report(spacing: &GridSpacing, items: i32, extent: i32) -> Result<Vec<String>> {
    let columns = spacing.config().column_count();
    let mut lines: Vec<String> = spacing
        .all_margins(items, extent)?
        .into_iter()
        .enumerate()
        .map(|(index, m)| {
            let index = index as i32;
            format!(
                "#{:<4} row {:<3} col {:<3} left={} top={} right={} bottom={}",
                index,
                index / columns,
                index % columns,
                m.left,
                m.top,
                m.right,
                m.bottom
            )
        })
        .collect();
    lines.push(format!("item extent: {}px", spacing.item_extent(extent)));
    Ok(lines)
}

/// GET a URL through the client's interceptor chain
pub async fn handle_fetch(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let client_config = config.client.to_runtime_config();
    let client = if args.https_only {
        HttpClient::secure(client_config)?
    } else {
        HttpClient::new(client_config)?
    };

    let mut request = HttpRequest::get(&args.url)?;
    if args.no_log {
        request = request.header(LOG_REQUEST_KEY, "false")?;
    }

    let start = Instant::now();
    let response = client.execute(request).await?;

    println!(
        "{} {} ({} bytes, {}ms)",
        response.status.as_u16(),
        response.status.canonical_reason().unwrap_or(""),
        response.body.len(),
        start.elapsed().as_millis()
    );
    if let Some(content_type) = response.content_type() {
        println!("content-type: {}", content_type);
    }
    if args.body {
        println!();
        println!("{}", response.text());
    }
    Ok(())
}

/// Load an image through the image loader and write a compressed copy
pub async fn handle_image(args: ImageArgs, config: &AppConfig) -> Result<()> {
    let (client_config, loader_config, dirs) = config.to_runtime_config();
    let client = HttpClient::new(client_config)?;
    let loader = ImageLoader::new(loader_config, client, &dirs).await?;

    let slot = Arc::new(ImageSlot::new());
    let listener: Arc<dyn ImageLoadingListener> = Arc::new(LogListener);
    let image = loader
        .display_image_with(&args.source, slot, Default::default(), Some(listener))
        .await?;

    let option = args.compress_option();
    info!("Compressing {} with {}", args.source, option);
    let compressed = tokio::task::spawn_blocking(move || bitmap::compress(&image, &option))
        .await
        .map_err(|e| AppError::generic(format!("Compression task failed: {}", e)))??;

    let out = output_path(&args.out, compressed.extension());
    tokio::fs::write(&out, &compressed.bytes).await?;

    println!(
        "Wrote {} ({}x{}, {} KB)",
        out.display(),
        compressed.width,
        compressed.height,
        compressed.size_kb()
    );
    Ok(())
}

fn output_path(requested: &std::path::Path, extension: &str) -> PathBuf {
    requested.with_extension(extension)
}

/// Print every resolved cache directory
pub async fn handle_dirs(args: DirsArgs, config: &AppConfig) -> Result<()> {
    let dirs_config = DirsConfigToml {
        package_name: args
            .package
            .unwrap_or_else(|| config.dirs.package_name.clone()),
        ..config.dirs.clone()
    };
    let dirs = dirs_config.to_runtime_config(config.debug.enabled);
    debug!("Resolving cache directories: {:?}", dirs);

    let show = |path: Option<PathBuf>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no external storage)".to_string())
    };

    println!("debug:        {}", dirs.is_debug());
    println!("cache:        {}", dirs.cache_dir().display());
    println!("images:       {}", dirs.image_cache_dir().display());
    println!("datas:        {}", dirs.data_cache_dir().display());
    println!("logs:         {}", dirs.log_dir().display());
    println!("sd root:      {}", show(dirs.sd_root_dir()));
    println!("sd images:    {}", show(dirs.sd_image_dir()));
    println!("sd datas:     {}", show(dirs.sd_data_dir()));
    println!("sd tmp:       {}", show(dirs.sd_temp_dir()));
    Ok(())
}

/// Handle configuration commands
pub async fn handle_config(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        ConfigAction::Init { path, force } => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::get_default_config_path()?,
            };
            if path.exists() && !force {
                println!("Configuration already exists: {}", path.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }
            AppConfig::write_default(&path).await?;
            println!("📁 Wrote default configuration to {}", path.display());
        }
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grid_report_lines() {
        let config = GridSpacingConfig::with_row_edges(3, 5, 5, 10, 20).unwrap();
        let spacing = GridSpacing::vertical(config);
        let lines = grid_report(&spacing, 4, 300).unwrap();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("#0    row 0   col 0"));
        assert!(lines[0].ends_with("left=0 top=5 right=7 bottom=10"));
        assert!(lines[3].contains("row 1"));
        assert_eq!(lines[4], "item extent: 93px");
    }

    #[test]
    fn test_horizontal_grid_report_uses_screen_sides() {
        let spacing = GridSpacing::horizontal_with_edges(2, 4, 6, 8, 2, 10, 20).unwrap();
        let lines = grid_report(&spacing, 2, 400).unwrap();

        assert!(lines[0].ends_with("left=8 top=4 right=2 bottom=11"));
        assert_eq!(lines[2], "item extent: 185px");
    }

    #[test]
    fn test_output_path_takes_encoding_extension() {
        assert_eq!(
            output_path(std::path::Path::new("out/photo.png"), "jpg"),
            PathBuf::from("out/photo.jpg")
        );
        assert_eq!(
            output_path(std::path::Path::new("photo"), "png"),
            PathBuf::from("photo.png")
        );
    }

    #[tokio::test]
    async fn test_grid_rejects_zero_columns() {
        let args = GridArgs {
            columns: 0,
            extent: 300,
            items: 3,
            h_gap: 0,
            v_gap: 0,
            first_row: 0,
            last_row: 0,
            first_col: 0,
            last_col: 0,
            horizontal: false,
        };
        let err = handle_grid(args).await.unwrap_err();
        assert_eq!(err.category(), "layout");
    }

    #[tokio::test]
    async fn test_config_init_writes_parseable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("commonlib.toml");
        let args = ConfigArgs {
            action: ConfigAction::Init {
                path: Some(path.clone()),
                force: false,
            },
        };

        handle_config(args, &AppConfig::default()).await.unwrap();
        let loaded = AppConfig::load(Some(path)).await.unwrap();
        assert_eq!(loaded, AppConfig::default());
    }
}
