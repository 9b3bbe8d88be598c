use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use lol_anm::Anm;
use miette::{Context, Result};
use owo_colors::OwoColorize;

#[derive(clap::Subcommand)]
pub enum AnmCommands {
    /// Print the header and joints of an animation
    Info(InfoArgs),
}

impl AnmCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            AnmCommands::Info(info) => info.handle(),
        }
    }
}

#[derive(Args)]
pub struct InfoArgs {
    /// An input ANM file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Also list every joint hash with its key count
    #[arg(long, default_value_t = false)]
    joints: bool,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let anm = Anm::read(&self.file).context(format!("reading {}", self.file.display()))?;

        println!("{}", self.file.display().bold());
        println!("  kind:     {:?} v{}", anm.kind, anm.version);
        println!("  fps:      {}", anm.fps);
        println!(
            "  duration: {} frames ({} written)",
            anm.duration,
            anm.frame_count()
        );
        println!("  tracks:   {}", anm.tracks.len());
        if let Some(metrics) = &anm.error_metrics {
            println!(
                "  error:    rotate {:?} translate {:?} scale {:?}",
                metrics.rotate, metrics.translate, metrics.scale
            );
        }

        if self.joints {
            let joints = anm
                .tracks
                .iter()
                .sorted_by_key(|track| track.joint_hash)
                .map(|track| format!("{:08x} ({} keys)", track.joint_hash, track.poses.len()))
                .join("\n    ");
            println!("  joints:\n    {joints}");
        }

        Ok(())
    }
}
