use crate::game::{Game, Phase};
use crossterm::{
    cursor, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use std::io::{self, Write};

const CAR: [&str; 3] = [" ^ ", "/#\\", "/ \\"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrameCell {
    ch: char,
    fg: Color,
    bg: Color,
    bold: bool,
}

const BLANK: FrameCell = FrameCell {
    ch: ' ',
    fg: Color::White,
    bg: Color::Black,
    bold: false,
};

// never drawn, so every cell differs from it on the next flush
const STALE: FrameCell = FrameCell {
    ch: '\0',
    fg: Color::Reset,
    bg: Color::Reset,
    bold: false,
};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Palette {
    hud_fg: Color,
    hud_bg: Color,
    grass_fg: Color,
    border_fg: Color,
    stripe_fg: Color,
    road_bg: Color,
    car_fg: Color,
    alert_fg: Color,
}

impl Palette {
    pub(crate) fn new(color: bool) -> Self {
        if !color {
            return Self {
                hud_fg: Color::White,
                hud_bg: Color::Black,
                grass_fg: Color::White,
                border_fg: Color::White,
                stripe_fg: Color::White,
                road_bg: Color::Black,
                car_fg: Color::White,
                alert_fg: Color::White,
            };
        }
        Self {
            hud_fg: Color::Rgb {
                r: 230,
                g: 230,
                b: 230,
            },
            hud_bg: Color::Rgb { r: 8, g: 8, b: 12 },
            grass_fg: Color::Rgb {
                r: 70,
                g: 170,
                b: 70,
            },
            border_fg: Color::Rgb {
                r: 240,
                g: 240,
                b: 240,
            },
            stripe_fg: Color::Rgb {
                r: 250,
                g: 220,
                b: 120,
            },
            road_bg: Color::Rgb {
                r: 20,
                g: 20,
                b: 24,
            },
            car_fg: Color::Yellow,
            alert_fg: Color::Rgb {
                r: 255,
                g: 110,
                b: 90,
            },
        }
    }
}

pub(crate) struct Renderer {
    w: u16,
    h: u16,
    prev: Vec<FrameCell>,
    cur: Vec<FrameCell>,
}

impl Renderer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        let n = (w as usize) * (h as usize);
        Self {
            w,
            h,
            prev: vec![STALE; n],
            cur: vec![BLANK; n],
        }
    }

    /// Resized buffers repaint every cell on the next flush.
    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        *self = Self::new(w, h);
    }

    fn clear_to(&mut self, fg: Color, bg: Color) {
        for c in &mut self.cur {
            *c = FrameCell {
                ch: ' ',
                fg,
                bg,
                bold: false,
            };
        }
    }

    fn put(&mut self, x: i32, y: i32, cell: FrameCell) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 {
            return;
        }
        let i = (y as usize) * (self.w as usize) + (x as usize);
        self.cur[i] = cell;
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color, bold: bool) {
        for (k, ch) in s.chars().enumerate() {
            self.put(x + k as i32, y, FrameCell { ch, fg, bg, bold });
        }
    }

    fn put_centered(&mut self, y: i32, s: &str, fg: Color, bg: Color) {
        let x = (self.w as i32 - s.chars().count() as i32) / 2;
        self.put_str(x.max(0), y, s, fg, bg, true);
    }

    /// Writes only the cells that changed since the last flush.
    pub(crate) fn flush_diff<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        let mut cur_fg = None::<Color>;
        let mut cur_bg = None::<Color>;
        let mut cur_bold = false;

        for y in 0..self.h {
            let row_off = (y as usize) * (self.w as usize);
            for x in 0..self.w {
                let i = row_off + (x as usize);
                let a = self.cur[i];
                if a == self.prev[i] {
                    continue;
                }
                queue!(out, cursor::MoveTo(x, y))?;
                if cur_fg != Some(a.fg) {
                    queue!(out, SetForegroundColor(a.fg))?;
                    cur_fg = Some(a.fg);
                }
                if cur_bg != Some(a.bg) {
                    queue!(out, SetBackgroundColor(a.bg))?;
                    cur_bg = Some(a.bg);
                }
                if cur_bold != a.bold {
                    let attr = if a.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(out, SetAttribute(attr))?;
                    cur_bold = a.bold;
                }
                queue!(out, Print(a.ch))?;
            }
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        self.prev.copy_from_slice(&self.cur);
        Ok(())
    }

    #[cfg(test)]
    fn cell(&self, x: i32, y: i32) -> FrameCell {
        self.cur[(y as usize) * (self.w as usize) + (x as usize)]
    }

    #[cfg(test)]
    fn row_text(&self, y: i32) -> String {
        (0..self.w as i32).map(|x| self.cell(x, y).ch).collect()
    }
}

/// Paints road, car, HUD and, after a crash, the restart prompt.
pub(crate) fn draw_scene(r: &mut Renderer, game: &Game, pal: &Palette) {
    r.clear_to(pal.grass_fg, pal.hud_bg);

    let (score, speed) = game.hud();
    let track = game.track();
    let width = r.w as i32;
    let stripe_phase = score % 4;

    let visible = track.rows().min(r.h as usize);
    for (row, center) in track.centers().enumerate().take(visible) {
        let y = row as i32;
        let (left, right) = track.edges(y);
        let left = left.max(0);
        let right = right.min(width - 1);
        for x in 0..width {
            let cell = if x == left || x == right {
                FrameCell {
                    ch: '│',
                    fg: pal.border_fg,
                    bg: pal.road_bg,
                    bold: false,
                }
            } else if x > left && x < right {
                FrameCell {
                    ch: ' ',
                    fg: pal.border_fg,
                    bg: pal.road_bg,
                    bold: false,
                }
            } else {
                FrameCell {
                    ch: '.',
                    fg: pal.grass_fg,
                    bg: pal.hud_bg,
                    bold: false,
                }
            };
            r.put(x, y, cell);
        }
        if row as u64 % 4 == stripe_phase {
            r.put(
                center,
                y,
                FrameCell {
                    ch: ':',
                    fg: pal.stripe_fg,
                    bg: pal.road_bg,
                    bold: false,
                },
            );
        }
    }

    let p = game.player();
    for (k, line) in CAR.iter().enumerate() {
        let y = p.row - (2 - k as i32);
        for (dx, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let x = p.column - 1 + dx as i32;
            r.put(
                x,
                y,
                FrameCell {
                    ch,
                    fg: pal.car_fg,
                    bg: pal.road_bg,
                    bold: true,
                },
            );
        }
    }

    let hud = format!(" Score:{score}  Speed:{speed}  Quit:q ");
    r.put_str(0, 0, &hud, pal.hud_fg, pal.hud_bg, false);

    if game.phase() == Phase::Paused {
        let mid = r.h as i32 / 2;
        r.put_centered(mid, &format!(" CRASH! Score: {score} "), pal.alert_fg, pal.hud_bg);
        r.put_centered(mid + 1, " Press R to restart or Q to quit ", pal.hud_fg, pal.hud_bg);
    }
}

pub(crate) fn draw_too_small(r: &mut Renderer, need_w: i32, need_h: i32, pal: &Palette) {
    r.clear_to(pal.hud_fg, pal.hud_bg);
    let mid = r.h as i32 / 2;
    r.put_centered(mid, "Terminal too small", pal.alert_fg, pal.hud_bg);
    r.put_centered(
        mid + 1,
        &format!("need at least {need_w}x{need_h}"),
        pal.hud_fg,
        pal.hud_bg,
    );
}
