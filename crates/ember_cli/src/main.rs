//! Ember command-line renderer.
//!
//! Renders one or more `.crtscene` files, one after another, on a shared
//! thread pool. Each image is written next to the others in the output
//! directory, named after its scene file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ember_renderer::{render, ImageFormat, RenderConfig, Scene, ThreadPool};

fn cli() -> Command {
    Command::new("ember")
        .about("Multithreaded CPU ray tracer for .crtscene files")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("scenes")
                .help("Scene files to render")
                .required(true)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .help("Worker threads [default: hardware threads - 1]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("Consecutive pixels per unit of work")
                .default_value("16")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .help("Maximum reflection/refraction depth")
                .default_value("4")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Directory for rendered images")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output image format")
                .default_value("ppm")
                .value_parser(["ppm", "png"]),
        )
}

/// Settings gathered from the command line.
#[derive(Debug)]
struct Options {
    scenes: Vec<PathBuf>,
    threads: usize,
    output_dir: PathBuf,
    format: ImageFormat,
    config: RenderConfig,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let scenes = matches
            .get_many::<PathBuf>("scenes")
            .context("No scene files given")?
            .cloned()
            .collect();

        let threads = matches
            .get_one::<usize>("threads")
            .copied()
            .unwrap_or_else(ThreadPool::default_thread_count);
        anyhow::ensure!(threads > 0, "--threads must be at least 1");

        let chunk_size = matches.get_one::<usize>("chunk-size").copied().unwrap_or(16);
        anyhow::ensure!(chunk_size > 0, "--chunk-size must be at least 1");

        let max_depth = matches.get_one::<u32>("max-depth").copied().unwrap_or(4);

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("png") => ImageFormat::Png,
            _ => ImageFormat::Ppm,
        };

        let output_dir = matches
            .get_one::<PathBuf>("output-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            scenes,
            threads,
            output_dir,
            format,
            config: RenderConfig::default()
                .with_max_depth(max_depth)
                .with_pixels_per_chunk(chunk_size),
        })
    }
}

/// `<output_dir>/<scene file stem>.<ext>`
fn output_path(scene: &Path, output_dir: &Path, format: ImageFormat) -> PathBuf {
    let stem = scene.file_stem().unwrap_or(scene.as_os_str());
    output_dir.join(stem).with_extension(format.extension())
}

fn render_scene(path: &Path, pool: &ThreadPool, options: &Options) -> Result<()> {
    let load_start = Instant::now();
    let description = ember_core::load_scene(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let scene = Scene::new(description)
        .with_context(|| format!("Invalid scene {}", path.display()))?;
    log::info!(
        "Loaded {} ({}x{}, {} triangles) in {:.2?}",
        path.display(),
        scene.width(),
        scene.height(),
        scene.triangle_count(),
        load_start.elapsed()
    );

    let render_start = Instant::now();
    let image = render(&scene, pool, &options.config)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    log::info!("Rendered {} in {:.2?}", path.display(), render_start.elapsed());

    let output = output_path(path, &options.output_dir, options.format);
    image
        .save(&output, options.format)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Saved {}", output.display());

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::from_matches(&cli().get_matches())?;
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let mut pool = ThreadPool::new(options.threads);
    pool.start().context("Failed to start thread pool")?;
    log::info!("Rendering {} scene(s) on {} threads", options.scenes.len(), options.threads);

    let total = Instant::now();
    for scene in &options.scenes {
        render_scene(scene, &pool, &options)?;
    }
    pool.stop();

    log::info!("Done in {:.2?}", total.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let matches = cli().try_get_matches_from(["ember", "scene0.crtscene"]).unwrap();
        let options = Options::from_matches(&matches).unwrap();

        assert_eq!(options.scenes, vec![PathBuf::from("scene0.crtscene")]);
        assert!(options.threads >= 1);
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert_eq!(options.format, ImageFormat::Ppm);
        assert_eq!(options.config, RenderConfig::default());
    }

    #[test]
    fn test_all_options() {
        let matches = cli()
            .try_get_matches_from([
                "ember",
                "a.crtscene",
                "b.crtscene",
                "--threads",
                "3",
                "--chunk-size",
                "64",
                "--max-depth",
                "6",
                "-o",
                "renders",
                "--format",
                "png",
            ])
            .unwrap();
        let options = Options::from_matches(&matches).unwrap();

        assert_eq!(options.scenes.len(), 2);
        assert_eq!(options.threads, 3);
        assert_eq!(options.config.pixels_per_chunk, 64);
        assert_eq!(options.config.max_depth, 6);
        assert_eq!(options.output_dir, PathBuf::from("renders"));
        assert_eq!(options.format, ImageFormat::Png);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let matches = cli()
            .try_get_matches_from(["ember", "a.crtscene", "--threads", "0"])
            .unwrap();
        assert!(Options::from_matches(&matches).is_err());
    }

    #[test]
    fn test_scene_required() {
        assert!(cli().try_get_matches_from(["ember"]).is_err());
    }

    #[test]
    fn test_output_path() {
        let path = output_path(
            Path::new("scenes/scene3.crtscene"),
            Path::new("out"),
            ImageFormat::Png,
        );
        assert_eq!(path, PathBuf::from("out/scene3.png"));

        let path = output_path(Path::new("plain"), Path::new("."), ImageFormat::Ppm);
        assert_eq!(path, PathBuf::from("./plain.ppm"));
    }

    #[test]
    fn test_render_scene_end_to_end() {
        let dir = std::env::temp_dir().join(format!("ember_cli_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let scene = dir.join("tiny.crtscene");
        std::fs::write(
            &scene,
            r#"{
                "settings": {
                    "background_color": [0.5, 0.5, 0.5],
                    "image_settings": { "width": 4, "height": 3 }
                },
                "camera": { "position": [0, 0, 3], "matrix": [1, 0, 0, 0, 1, 0, 0, 0, 1] },
                "lights": [ { "intensity": 100, "position": [0, 0, 3] } ],
                "materials": [ { "type": "diffuse", "albedo": [1, 0, 0] } ],
                "objects": [
                    { "material_index": 0, "vertices": [-1, -1, 0, 1, -1, 0, 0, 1, 0], "triangles": [0, 1, 2] }
                ]
            }"#,
        )
        .unwrap();

        let matches = cli()
            .try_get_matches_from([
                OsStr::new("ember"),
                scene.as_os_str(),
                OsStr::new("-o"),
                dir.as_os_str(),
                OsStr::new("-j"),
                OsStr::new("2"),
            ])
            .unwrap();
        let options = Options::from_matches(&matches).unwrap();

        let mut pool = ThreadPool::new(options.threads);
        pool.start().unwrap();
        render_scene(&scene, &pool, &options).unwrap();
        pool.stop();

        let text = std::fs::read_to_string(dir.join("tiny.ppm")).unwrap();
        assert!(text.starts_with("P3\n4 3\n255\n"));
        assert_eq!(text.lines().count(), 6);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
