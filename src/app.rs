use crate::config::Settings;
use crate::game::{compute_tick_delay, Game, Phase, MIN_ROWS};
use crate::input::{collect_input_nonblocking, wait_for_input};
use crate::render::{draw_scene, draw_too_small, Palette, Renderer};
use crate::track::TrackGeometry;
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    style::ResetColor,
    terminal::{self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout};
use tracing::{info, warn};

struct App {
    settings: Settings,
    palette: Palette,
    game: Game,
    renderer: Renderer,
    out: Stdout,
    too_small: bool,
}

impl App {
    fn run(&mut self) -> Result<()> {
        let mouse = self.settings.enable_mouse;
        loop {
            let idle = self.too_small || self.game.phase() == Phase::Paused;
            let mut batch = if idle {
                wait_for_input(mouse)?
            } else {
                collect_input_nonblocking(mouse)?
            };

            if let Some((w, h)) = batch.resized {
                self.handle_resize(w, h);
            }
            if self.too_small {
                batch.keep_quit_only();
            }
            for ev in batch.events {
                self.game.apply_input(ev);
            }
            if self.game.phase() == Phase::Terminated {
                break;
            }

            if !self.too_small {
                self.game.tick();
                self.game.check_collision();
            }

            self.render()?;

            if !self.too_small && self.game.phase() == Phase::Running {
                std::thread::sleep(compute_tick_delay(self.game.player().speed));
            }
        }

        let (score, speed) = self.game.hud();
        info!(score, speed, "quit");
        Ok(())
    }

    fn handle_resize(&mut self, w: u16, h: u16) {
        self.renderer.resize(w, h);
        match self.game.resize(i32::from(w), i32::from(h)) {
            Ok(()) => self.too_small = false,
            Err(e) => {
                warn!(width = w, height = h, error = %e, "terminal too small");
                self.too_small = true;
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        if self.too_small {
            let rules = &self.settings.rules;
            let need_w = TrackGeometry::min_width(rules.half_width, rules.margin);
            draw_too_small(&mut self.renderer, need_w, MIN_ROWS, &self.palette);
        } else {
            draw_scene(&mut self.renderer, &self.game, &self.palette);
        }
        self.renderer.flush_diff(&mut self.out)?;
        Ok(())
    }
}

pub(crate) fn run(settings: Settings) -> Result<()> {
    let (cols, rows) = terminal::size().context("could not query terminal size")?;
    let seed = settings.seed_or_random();
    let game = Game::new(i32::from(cols), i32::from(rows), settings.rules, seed)
        .context("terminal cannot fit the road")?;
    info!(cols, rows, seed, rules = ?settings.rules, "starting");

    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        out,
        EnterAlternateScreen,
        cursor::Hide,
        DisableLineWrap,
        terminal::Clear(terminal::ClearType::All)
    )?;
    if settings.enable_mouse {
        execute!(out, EnableMouseCapture)?;
    }

    let mut app = App {
        palette: Palette::new(settings.enable_color),
        renderer: Renderer::new(cols, rows),
        settings,
        game,
        out,
        too_small: false,
    };
    let res = app.run();

    // restore
    let mut out = app.out;
    if app.settings.enable_mouse {
        let _ = execute!(out, DisableMouseCapture);
    }
    let _ = execute!(
        out,
        EnableLineWrap,
        cursor::Show,
        LeaveAlternateScreen,
        ResetColor
    );
    let _ = terminal::disable_raw_mode();

    res
}
