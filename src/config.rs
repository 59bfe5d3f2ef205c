use crate::game::{Rules, DEFAULT_SPEED, MAX_SPEED};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roadrace")]
#[command(about = "Drive a car down an endless winding road in the terminal", long_about = None)]
pub(crate) struct Args {
    /// RNG seed for the road (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Starting speed level, 0 (slow) to 5 (fast)
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: u8,

    /// Half the road width in columns
    #[arg(long, default_value_t = 12)]
    half_width: i32,

    /// Columns kept between the road edge and the screen edge
    #[arg(long, default_value_t = 2)]
    margin: i32,

    /// Largest sideways shift of the road per row
    #[arg(long, default_value_t = 3)]
    step: i32,

    /// Start on an S-bend instead of a straight road
    #[arg(long, default_value_t = false)]
    curvy_start: bool,

    /// Plain white-on-black rendering
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Ignore mouse clicks and drags
    #[arg(long, default_value_t = false)]
    no_mouse: bool,

    /// Write a trace log to this file (filter with RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) rules: Rules,
    pub(crate) seed: Option<u64>,
    pub(crate) enable_color: bool,
    pub(crate) enable_mouse: bool,
    pub(crate) log_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            seed: None,
            enable_color: true,
            enable_mouse: true,
            log_path: None,
        }
    }
}

impl Settings {
    pub(crate) fn from_args(args: Args) -> Result<Self> {
        if args.speed > MAX_SPEED {
            bail!("--speed must be between 0 and {MAX_SPEED}, got {}", args.speed);
        }
        if args.half_width < 1 {
            bail!("--half-width must be at least 1, got {}", args.half_width);
        }
        if args.margin < 0 {
            bail!("--margin cannot be negative, got {}", args.margin);
        }
        if args.step < 1 {
            bail!("--step must be at least 1, got {}", args.step);
        }
        Ok(Self {
            rules: Rules {
                half_width: args.half_width,
                margin: args.margin,
                step_bound: args.step,
                start_speed: args.speed,
                curvy_start: args.curvy_start,
            },
            seed: args.seed,
            enable_color: !args.no_color,
            enable_mouse: !args.no_mouse,
            log_path: args.log,
        })
    }

    pub(crate) fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
