//! Text shaping: line breaking, measurement and drawing of rich text.
//!
//! [`measure`] breaks a [`RichText`] into lines no wider than a budget,
//! measuring every run through the injected [`RenderContext`]. [`write`]
//! draws a measured block anchored at a point, horizontally or rotated.

use log::trace;

use figura_core::{
    draw::{
        HAlign, MeasuredLine, MeasuredRichText, MeasuredSegment, RenderContext, RichText,
        RichTextStyle, Rotation, TextAlign, TextStyle, VAlign,
    },
    geometry::Point,
};

use crate::error::FiguraError;

/// One emphasis-uniform piece of a word.
#[derive(Debug, Clone)]
struct Piece<'a> {
    text: &'a str,
    bold: bool,
    italic: bool,
}

/// Pieces with no whitespace between them; lines only break between words.
type Word<'a> = Vec<Piece<'a>>;

/// A run being assembled on the current line.
#[derive(Debug, Clone)]
struct Run {
    text: String,
    style: TextStyle,
    width: f32,
    ascent: f32,
    descent: f32,
}

/// Splits rich text into hard lines of words.
fn hard_lines(rich: &RichText) -> Vec<Vec<Word<'_>>> {
    let mut lines = vec![Vec::<Word<'_>>::new()];
    let mut glue = false;

    for segment in rich.segments() {
        let mut rest = segment.text.as_str();
        while !rest.is_empty() {
            let Some(first) = rest.chars().next() else {
                break;
            };
            if first == '\n' {
                lines.push(Vec::new());
                glue = false;
                rest = &rest[1..];
            } else if first.is_whitespace() {
                glue = false;
                rest = &rest[first.len_utf8()..];
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let piece = Piece {
                    text: &rest[..end],
                    bold: segment.bold,
                    italic: segment.italic,
                };
                if let Some(line) = lines.last_mut() {
                    match line.last_mut() {
                        Some(word) if glue => word.push(piece),
                        _ => line.push(vec![piece]),
                    }
                }
                glue = true;
                rest = &rest[end..];
            }
        }
    }
    lines
}

fn measure_run(
    ctx: &dyn RenderContext,
    text: &str,
    style: TextStyle,
) -> Result<Run, FiguraError> {
    let metrics = ctx.measure_text(text, &style);
    let (Some(ascent), Some(descent)) = (metrics.font_ascent, metrics.font_descent) else {
        return Err(FiguraError::MissingFontMetrics {
            font: style.font_family().to_string(),
        });
    };
    Ok(Run {
        text: text.to_string(),
        width: metrics.width,
        ascent,
        descent,
        style,
    })
}

/// Appends `word` to a copy of `runs`, re-measuring only the runs it touches.
fn extend_runs(
    ctx: &dyn RenderContext,
    base: &RichTextStyle,
    runs: &[Run],
    word: &Word<'_>,
) -> Result<Vec<Run>, FiguraError> {
    let mut candidate = runs.to_vec();
    for (i, piece) in word.iter().enumerate() {
        let separator = if i == 0 && !candidate.is_empty() { " " } else { "" };
        let style = base.resolve(piece.bold, piece.italic);
        let same_style = candidate.last().is_some_and(|last| last.style == style);
        if same_style {
            if let Some(last) = candidate.last_mut() {
                let text = format!("{}{separator}{}", last.text, piece.text);
                *last = measure_run(ctx, &text, style)?;
            }
            continue;
        }
        if let Some(last) = candidate.last_mut().filter(|_| !separator.is_empty()) {
            // The space keeps the previous run's style.
            let text = format!("{}{separator}", last.text);
            let previous = last.style.clone();
            *last = measure_run(ctx, &text, previous)?;
        }
        candidate.push(measure_run(ctx, piece.text, style)?);
    }
    Ok(candidate)
}

fn runs_width(runs: &[Run]) -> f32 {
    runs.iter().map(|run| run.width).sum()
}

fn close_line(
    ctx: &dyn RenderContext,
    base: &RichTextStyle,
    runs: Vec<Run>,
    y: f32,
) -> Result<MeasuredLine, FiguraError> {
    let (ascent, descent) = if runs.is_empty() {
        let empty = measure_run(ctx, "", base.resolve(false, false))?;
        (empty.ascent, empty.descent)
    } else {
        runs.iter().fold((0.0f32, 0.0f32), |(a, d), run| {
            (a.max(run.ascent), d.max(run.descent))
        })
    };
    let content = ascent + descent;
    let height = content * base.line_height();
    let baseline = ascent + (height - content) / 2.0;

    let mut x = 0.0;
    let segments: Vec<_> = runs
        .into_iter()
        .map(|run| {
            let segment = MeasuredSegment::new(run.text, x, run.width, run.style);
            x += run.width;
            segment
        })
        .collect();

    Ok(MeasuredLine::new(y, baseline, x, height, segments))
}

/// Breaks and measures rich text against `max_width`.
///
/// Lines break between whitespace-separated words; a word that alone is
/// wider than `max_width` overflows its own line. Explicit `\n` breaks add
/// the style's line-break gap.
///
/// # Errors
///
/// Returns [`FiguraError::MissingFontMetrics`] when the context reports no
/// ascent or descent.
pub fn measure(
    ctx: &dyn RenderContext,
    rich: &RichText,
    max_width: f32,
) -> Result<MeasuredRichText, FiguraError> {
    layout(ctx, rich, max_width, Rotation::Horizontal)
}

/// Breaks text against a height budget and rotates it by ±90°.
///
/// The measured block's on-page width and height are swapped relative to
/// [`measure`]; see [`MeasuredRichText::size`].
pub fn measure_rotated(
    ctx: &dyn RenderContext,
    rich: &RichText,
    max_height: f32,
    rotation: Rotation,
) -> Result<MeasuredRichText, FiguraError> {
    layout(ctx, rich, max_height, rotation)
}

fn layout(
    ctx: &dyn RenderContext,
    rich: &RichText,
    max_width: f32,
    rotation: Rotation,
) -> Result<MeasuredRichText, FiguraError> {
    if rich.is_empty() {
        return Ok(MeasuredRichText::new(Vec::new(), 0.0, 0.0, rotation));
    }

    let base = rich.style();
    let hard = hard_lines(rich);
    let breaks = hard.len().saturating_sub(1);
    let mut lines = Vec::new();
    let mut y = 0.0;

    for (i, words) in hard.iter().enumerate() {
        if i > 0 {
            y += base.line_break_gap();
        }
        let mut runs: Vec<Run> = Vec::new();
        for word in words {
            let candidate = extend_runs(ctx, base, &runs, word)?;
            if runs_width(&candidate) > max_width && !runs.is_empty() {
                let line = close_line(ctx, base, std::mem::take(&mut runs), y)?;
                y += line.height();
                lines.push(line);
                runs = extend_runs(ctx, base, &runs, word)?;
            } else {
                runs = candidate;
            }
        }
        let line = close_line(ctx, base, runs, y)?;
        y += line.height();
        lines.push(line);
    }

    let width = lines.iter().map(MeasuredLine::width).fold(0.0, f32::max);
    trace!(
        lines = lines.len(),
        breaks,
        width,
        height = y,
        max_width;
        "Measured rich text"
    );
    Ok(MeasuredRichText::new(lines, width, y, rotation))
}

/// Line alignment inside a rotated block, derived from the vertical
/// alignment of the block.
fn rotated_line_align(rotation: Rotation, vertical: VAlign) -> HAlign {
    match (rotation, vertical) {
        (_, VAlign::Middle) => HAlign::Center,
        (Rotation::Clockwise, VAlign::Top) | (Rotation::Anticlockwise, VAlign::Bottom) => {
            HAlign::Left
        }
        (Rotation::Clockwise, VAlign::Bottom) | (Rotation::Anticlockwise, VAlign::Top) => {
            HAlign::Right
        }
        (Rotation::Horizontal, _) => HAlign::Left,
    }
}

/// Draws measured text anchored at `position`.
///
/// `align` picks the anchor point of the block; see
/// [`PlacedText`](figura_core::draw::PlacedText).
pub fn write(
    ctx: &mut dyn RenderContext,
    measured: &MeasuredRichText,
    position: Point,
    align: TextAlign,
) {
    let size = measured.size();
    let left = position.x() - align.horizontal.offset(size.width(), 0.0);
    let top = position.y() - align.vertical.offset(size.height(), 0.0);
    let rotation = measured.rotation();

    let line_align = match rotation {
        Rotation::Horizontal => align.horizontal,
        _ => rotated_line_align(rotation, align.vertical),
    };

    for line in measured.lines() {
        let line_x = line_align.offset(measured.width(), line.width());
        let local_y = line.y() + line.baseline();
        for segment in line.segments() {
            let local_x = line_x + segment.x();
            let origin = match rotation {
                Rotation::Horizontal => Point::new(left + local_x, top + local_y),
                Rotation::Clockwise => Point::new(left + size.width() - local_y, top + local_x),
                Rotation::Anticlockwise => Point::new(left + local_y, top + size.height() - local_x),
            };
            ctx.draw_text(segment.text(), origin, segment.style(), rotation);
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use figura_core::draw::{DrawCall, RecordingContext};

    use super::*;

    fn style() -> RichTextStyle {
        RichTextStyle::new("test", 10.0).with_line_height(1.0)
    }

    fn ctx() -> RecordingContext {
        // 5px per character at size 10
        RecordingContext::new().with_char_width(0.5)
    }

    #[test]
    fn test_single_line_fits() {
        let rich = RichText::plain("hello world", style());
        let measured = measure(&ctx(), &rich, 1000.0).unwrap();
        assert_eq!(measured.lines().len(), 1);
        assert_approx_eq!(f32, measured.width(), 55.0);
        assert_approx_eq!(f32, measured.height(), 10.0);
        assert_approx_eq!(f32, measured.lines()[0].baseline(), 8.0);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let rich = RichText::plain("aaaa bbbb cccc", style());
        // "aaaa bbbb" is 45px
        let measured = measure(&ctx(), &rich, 45.0).unwrap();
        assert_eq!(measured.plain_text(), "aaaa bbbb\ncccc");
        assert_approx_eq!(f32, measured.lines()[1].y(), 10.0);
        assert_approx_eq!(f32, measured.height(), 20.0);
    }

    #[test]
    fn test_long_word_overflows_alone() {
        let rich = RichText::plain("tiny enormousword end", style());
        let measured = measure(&ctx(), &rich, 30.0).unwrap();
        assert_eq!(measured.plain_text(), "tiny\nenormousword\nend");
        assert!(measured.lines()[1].width() > 30.0);
    }

    #[test]
    fn test_style_change_splits_runs_not_lines() {
        let rich = RichText::parse("plain **bold** tail", style());
        let measured = measure(&ctx(), &rich, 1000.0).unwrap();
        assert_eq!(measured.lines().len(), 1);
        let segments = measured.lines()[0].segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text(), "plain ");
        assert_eq!(segments[1].text(), "bold ");
        assert!(segments[1].style().bold());
        assert_eq!(segments[2].text(), "tail");
        assert_approx_eq!(f32, segments[2].x(), 55.0);
    }

    #[test]
    fn test_glued_pieces_do_not_break() {
        let rich = RichText::parse("x **ab**cd", style());
        let measured = measure(&ctx(), &rich, 12.0).unwrap();
        assert_eq!(measured.plain_text(), "x\nabcd");
    }

    #[test]
    fn test_hard_breaks_add_gap_and_keep_empty_lines() {
        let rich = RichText::plain("one\n\nthree", style().with_line_break_gap(2.0));
        let measured = measure(&ctx(), &rich, 1000.0).unwrap();
        assert_eq!(measured.lines().len(), 3);
        assert!(measured.lines()[1].segments().is_empty());
        assert_approx_eq!(f32, measured.lines()[1].height(), 10.0);
        // three lines of 10px plus two gaps
        assert_approx_eq!(f32, measured.height(), 34.0);
    }

    #[test]
    fn test_line_height_multiplier() {
        let rich = RichText::plain("x", style().with_line_height(1.5));
        let measured = measure(&ctx(), &rich, 100.0).unwrap();
        assert_approx_eq!(f32, measured.height(), 15.0);
        // extra leading split above and below
        assert_approx_eq!(f32, measured.lines()[0].baseline(), 10.5);
    }

    #[test]
    fn test_empty_text_measures_zero() {
        let measured = measure(&ctx(), &RichText::plain("", style()), 100.0).unwrap();
        assert!(measured.lines().is_empty());
        assert_approx_eq!(f32, measured.size().height(), 0.0);
    }

    #[test]
    fn test_missing_font_metrics_is_fatal() {
        let ctx = RecordingContext::new().without_font_metrics();
        let err = measure(&ctx, &RichText::plain("x", style()), 100.0).unwrap_err();
        assert!(matches!(err, FiguraError::MissingFontMetrics { ref font } if font == "test"));
    }

    #[test]
    fn test_rotated_measure_transposes() {
        let rich = RichText::plain("aaaa bbbb", style());
        let measured = measure_rotated(&ctx(), &rich, 100.0, Rotation::Anticlockwise).unwrap();
        assert_approx_eq!(f32, measured.size().width(), 10.0);
        assert_approx_eq!(f32, measured.size().height(), 45.0);
    }

    #[test]
    fn test_write_horizontal_centered() {
        let mut ctx = ctx();
        let measured = measure(&ctx, &RichText::plain("ab", style()), 100.0).unwrap();
        write(&mut ctx, &measured, Point::new(50.0, 20.0), TextAlign::centered());
        let DrawCall::Text { origin, rotation, .. } = &ctx.calls()[0] else {
            panic!("expected text call");
        };
        assert_eq!(*rotation, Rotation::Horizontal);
        assert_approx_eq!(f32, origin.x(), 45.0);
        // top at 15, baseline 8 below
        assert_approx_eq!(f32, origin.y(), 23.0);
    }

    #[test]
    fn test_write_anticlockwise_reads_upwards() {
        let mut ctx = ctx();
        let rich = RichText::parse("ab **cd**", style());
        let measured = measure_rotated(&ctx, &rich, 100.0, Rotation::Anticlockwise).unwrap();
        write(&mut ctx, &measured, Point::new(0.0, 0.0), TextAlign::top_left());

        let origins: Vec<_> = ctx
            .calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins.len(), 2);
        // same baseline column, second run further up the page
        assert_approx_eq!(f32, origins[0].x(), origins[1].x());
        assert!(origins[1].y() < origins[0].y());
        // top alignment maps to the line end: the run ends at the block top
        assert_approx_eq!(f32, origins[1].y(), 10.0);
    }

    #[test]
    fn test_rotated_line_alignment_mapping() {
        assert_eq!(
            rotated_line_align(Rotation::Clockwise, VAlign::Top),
            HAlign::Left
        );
        assert_eq!(
            rotated_line_align(Rotation::Clockwise, VAlign::Bottom),
            HAlign::Right
        );
        assert_eq!(
            rotated_line_align(Rotation::Anticlockwise, VAlign::Top),
            HAlign::Right
        );
        assert_eq!(
            rotated_line_align(Rotation::Anticlockwise, VAlign::Bottom),
            HAlign::Left
        );
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn check_lines_within_budget(words: &[String], max_width: f32) {
            let rich = RichText::plain(words.join(" "), style());
            let measured = measure(&ctx(), &rich, max_width).unwrap();
            for line in measured.lines() {
                let word_count = line.text().split_whitespace().count();
                assert!(
                    line.width() <= max_width + 1e-3 || word_count == 1,
                    "line `{}` is {} wide, budget {}",
                    line.text(),
                    line.width(),
                    max_width
                );
            }
        }

        fn check_no_words_lost(words: &[String], max_width: f32) {
            let rich = RichText::plain(words.join(" "), style());
            let measured = measure(&ctx(), &rich, max_width).unwrap();
            let joined = measured.plain_text();
            let rebuilt: Vec<_> = joined.split_whitespace().collect();
            assert_eq!(rebuilt, words.iter().map(String::as_str).collect::<Vec<_>>());
        }

        proptest! {
            #[test]
            fn lines_within_budget(
                words in prop::collection::vec("[a-z]{1,12}", 1..30),
                max_width in 0.0f32..200.0,
            ) {
                check_lines_within_budget(&words, max_width);
            }

            #[test]
            fn no_words_lost(
                words in prop::collection::vec("[a-z]{1,12}", 1..30),
                max_width in 0.0f32..200.0,
            ) {
                check_no_words_lost(&words, max_width);
            }
        }
    }
}
