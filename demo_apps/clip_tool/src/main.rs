use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clip_studio::{AppController, EditorSettings, FileAssetReader};
use glam::Vec3;

#[derive(Parser)]
#[command(name = "clip_tool", version, about = "Edit the animation clips of a glTF model")]
struct Cli {
    /// Editor settings file (JSON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes and clips of a model
    Inspect {
        /// GLB or self-contained glTF file
        model: PathBuf,
    },

    /// Merge, rename and remove clips, then export
    Edit {
        /// GLB or self-contained glTF file
        model: PathBuf,

        /// Files whose clips are appended, in order; each clip is named after its file
        #[arg(short, long, num_args = 1..)]
        merge: Vec<PathBuf>,

        /// Rename a clip by list position: INDEX=NAME
        #[arg(long, value_parser = parse_rename)]
        rename: Vec<(usize, String)>,

        /// Remove the clip at a list position (applied after renames)
        #[arg(long)]
        remove: Vec<usize>,

        /// Advance the transform mode this many times before applying --nudge
        #[arg(long, default_value_t = 0)]
        mode_steps: usize,

        /// Gizmo delta applied to the model root: X,Y,Z
        #[arg(long, value_parser = parse_vec3)]
        nudge: Option<[f32; 3]>,

        /// Export pretty-printed glTF JSON instead of GLB
        #[arg(long)]
        json: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn parse_rename(s: &str) -> Result<(usize, String), String> {
    let (index, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=NAME, got '{s}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("invalid index '{index}': {e}"))?;
    Ok((index, name.to_string()))
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("invalid number '{p}': {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected X,Y,Z, got '{s}'")),
    }
}

async fn load_settings(path: Option<&Path>) -> Result<EditorSettings> {
    match path {
        Some(path) => EditorSettings::load(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(EditorSettings::default()),
    }
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))
}

fn print_clips(app: &AppController) {
    let clips = app.clips();
    if clips.is_empty() {
        println!("  (no clips)");
    }
    for (i, clip) in clips.iter().enumerate() {
        println!("  [{i}] {:<32} {:>8.3}s", clip.name, clip.duration);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref()).await?;
    let mut app = AppController::new(settings);

    match cli.command {
        Commands::Inspect { model } => {
            let reader = FileAssetReader::new(&model);
            app.open_asset(&reader, file_name(&model)?)
                .await
                .with_context(|| format!("Failed to load {}", model.display()))?;

            if let Some(asset) = app.asset() {
                println!(
                    "{}: {} nodes, {} meshes",
                    asset.name,
                    asset.node_count(),
                    asset.meshes.len()
                );
                if let Some(bounds) = asset.mesh_bounds() {
                    let (center, size) = (bounds.center(), bounds.size());
                    println!("  bounds: center {center}, size {size}");
                }
                for (_, clip) in asset.clips().iter() {
                    println!("  {} animates {}", clip.name, clip.target_node_names().join(", "));
                }
            }
            print_clips(&app);
        }

        Commands::Edit {
            model,
            merge,
            rename,
            remove,
            mode_steps,
            nudge,
            json,
            out,
        } => {
            let reader = FileAssetReader::new(&model);
            app.open_asset(&reader, file_name(&model)?)
                .await
                .with_context(|| format!("Failed to load {}", model.display()))?;

            for path in &merge {
                let reader = FileAssetReader::new(path);
                let report = app.open_clip_files(&reader, &[file_name(path)?]).await?;
                for (name, err) in &report.failed {
                    log::warn!("Skipped {name}: {err}");
                }
            }

            // Positions refer to the list as loaded and merged, before any edit.
            let ids: Vec<_> = app.clips().into_iter().map(|c| c.id).collect();
            for (index, name) in &rename {
                let Some(&id) = ids.get(*index) else {
                    bail!("No clip at position {index}");
                };
                app.rename_clip(id, name);
            }
            for index in &remove {
                let Some(&id) = ids.get(*index) else {
                    bail!("No clip at position {index}");
                };
                app.remove_clip(id);
            }

            for _ in 0..mode_steps {
                app.handle_transform_mode_advance();
            }
            if let Some([x, y, z]) = nudge {
                log::info!("Applying {} gizmo delta ({x}, {y}, {z})", app.transform_mode());
                app.apply_gizmo_delta(Vec3::new(x, y, z));
            }

            println!("Clips:");
            print_clips(&app);

            let path = app.save_export(!json, &out).await?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
