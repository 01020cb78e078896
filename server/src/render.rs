use std::io::Write;

use tokio::sync::broadcast;
use volley_shared::frame::Frame;

/// Consumer of frames. Must tolerate the same frame being rendered repeatedly.
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Collects frames in order.
impl Renderer for Vec<Frame> {
    fn render(&mut self, frame: &Frame) {
        self.push(frame.clone());
    }
}

/// Pushes frames to every connected WebSocket client.
pub struct BroadcastRenderer {
    tx: broadcast::Sender<Frame>,
}

impl BroadcastRenderer {
    pub fn new(tx: broadcast::Sender<Frame>) -> Self {
        Self { tx }
    }
}

impl Renderer for BroadcastRenderer {
    fn render(&mut self, frame: &Frame) {
        // No subscribers is fine; the next welcome carries the current frame.
        let _ = self.tx.send(frame.clone());
    }
}

/// Character-grid drawing of the half-court. The net is the top line, the
/// attack line is dashed, and each role label starts at its position.
#[derive(Debug, Clone, Copy)]
pub struct AsciiCourt {
    pub width: usize,
    pub height: usize,
    pub attack_line_y: f64,
}

impl AsciiCourt {
    pub fn new(width: usize, height: usize, attack_line_y: f64) -> Self {
        Self {
            width: width.max(2),
            height: height.max(2),
            attack_line_y,
        }
    }

    fn column(&self, x: f64) -> usize {
        ((x / 100.0) * (self.width - 1) as f64).round() as usize
    }

    fn row(&self, y: f64) -> usize {
        ((y / 100.0) * (self.height - 1) as f64).round() as usize
    }

    pub fn draw(&self, frame: &Frame) -> String {
        let mut grid = vec![vec![' '; self.width]; self.height];
        let attack_row = self.row(self.attack_line_y.clamp(0.0, 100.0));
        grid[attack_row].fill('-');

        for player in &frame.players {
            let row = self.row(player.y.clamp(0.0, 100.0));
            let col = self.column(player.x.clamp(0.0, 100.0));
            for (i, ch) in player.id.label().chars().enumerate() {
                if let Some(cell) = grid[row].get_mut(col + i) {
                    *cell = ch;
                }
            }
        }

        let state = if frame.playing { "playing" } else { "paused" };
        let mut out = format!("Rotation {} | {} | {}\n", frame.rotation, frame.formation, state);
        out.push_str(&"=".repeat(self.width));
        out.push('\n');
        for line in grid {
            out.extend(line);
            out.push('\n');
        }
        out
    }
}

/// Writes an [`AsciiCourt`] drawing per frame.
pub struct AsciiRenderer<W: Write> {
    court: AsciiCourt,
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(court: AsciiCourt, out: W) -> Self {
        Self { court, out }
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, frame: &Frame) {
        if let Err(e) = writeln!(self.out, "{}", self.court.draw(frame)) {
            tracing::error!("Failed to write court: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_shared::config::AnimationConfig;
    use volley_shared::rotation::AnimationState;
    use volley_shared::table::PositionTable;

    fn initial_frame() -> Frame {
        Frame::build(
            &AnimationState::default(),
            &PositionTable::standard(),
            &AnimationConfig::default(),
        )
    }

    #[test]
    fn ascii_court_places_setter() {
        let court = AsciiCourt::new(41, 21, 33.0);
        let drawing = court.draw(&initial_frame());
        let lines: Vec<&str> = drawing.lines().collect();
        assert_eq!(lines[0], "Rotation 1 | base | paused");
        assert_eq!(lines[1], "=".repeat(41));
        // Setter at (80, 70): column 32, grid row 14, after two header lines.
        assert_eq!(&lines[16][32..33], "S");
    }

    #[test]
    fn ascii_court_draws_attack_line() {
        let court = AsciiCourt::new(41, 21, 33.0);
        let drawing = court.draw(&initial_frame());
        let lines: Vec<&str> = drawing.lines().collect();
        // y = 33 maps to grid row 7.
        assert_eq!(lines[9], "-".repeat(41));
        assert_eq!(lines.len(), 2 + 21);
    }

    #[test]
    fn ascii_court_clips_labels_at_edge() {
        let mut frame = initial_frame();
        frame.players[1].x = 100.0;
        let court = AsciiCourt::new(20, 10, 33.0);
        let drawing = court.draw(&frame);
        let lines: Vec<&str> = drawing.lines().collect();
        assert!(lines[2..].iter().all(|l| l.len() == 20));
        // OH1 at y = 15 lands on grid row 1 with only its first letter visible.
        assert!(lines[3].ends_with('O'));
    }

    #[test]
    fn ascii_renderer_writes_each_frame() {
        let mut buf = Vec::new();
        {
            let mut renderer = AsciiRenderer::new(AsciiCourt::new(30, 12, 33.0), &mut buf);
            renderer.render(&initial_frame());
            renderer.render(&initial_frame());
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("Rotation 1 | base").count(), 2);
    }

    #[test]
    fn broadcast_renderer_without_subscribers_does_not_fail() {
        let (tx, _) = broadcast::channel(4);
        let mut renderer = BroadcastRenderer::new(tx.clone());
        renderer.render(&initial_frame());
        let mut rx = tx.subscribe();
        renderer.render(&initial_frame());
        assert_eq!(rx.try_recv().unwrap().rotation, 1);
    }

    #[test]
    fn vec_renderer_collects_in_order() {
        let mut frames: Vec<Frame> = Vec::new();
        let mut second = initial_frame();
        second.rotation = 2;
        frames.render(&initial_frame());
        frames.render(&second);
        assert_eq!(frames.iter().map(|f| f.rotation).collect::<Vec<_>>(), vec![1, 2]);
    }
}
