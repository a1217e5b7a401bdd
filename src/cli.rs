use clap::Parser;

use crate::field;

/// An animated particle-field background with proximity linking
#[derive(Parser)]
#[command()]
pub struct Args {
    /// Fixed particle count, overriding the width-derived default
    #[arg(short, long)]
    pub particles: Option<usize>,

    /// RNG seed; a random seed is chosen (and logged) when unset
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// The framerate the animation will run at
    ///
    /// if unset the loop runs as fast as the host allows
    #[arg(short, long)]
    pub framerate: Option<u32>,

    /// Distance below which particles are linked
    #[arg(short, long, default_value_t = field::LINK_DISTANCE)]
    pub link_distance: f32,
}
