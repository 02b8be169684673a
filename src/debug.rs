use itertools::Itertools;
use procr_ansi_term::{Color, Style};
use std::fmt;

use crate::{
    figure::{Anchor, Figure},
    point::Point,
    segment::Segment,
    triangles::Triangle,
    vertex::Vertex,
};

pub const STYLE_TYPE_NAME: Style = Style::new().bold().fg(Color::Purple);
pub const STYLE_LABEL: Style = Style::new().fg(Color::Yellow);
pub const STYLE_ITEM: Style = Style::new().fg(Color::Cyan);

pub const COLOR_GREEN: Color = Color::Fixed(40);
pub const COLOR_ORANGE: Color = Color::Fixed(208);

pub fn debug_with(
    f: impl Fn(&mut fmt::Formatter) -> fmt::Result,
) -> impl fmt::Debug {
    struct DebugWith<F>(F);

    impl<F> fmt::Debug for DebugWith<F>
    where
        F: Fn(&mut fmt::Formatter) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            self.0(f)
        }
    }

    DebugWith(f)
}

#[macro_export]
macro_rules! info_label {
    ($label:literal) => {
        $crate::debug::STYLE_LABEL
            .bold()
            .paint(format!("({})", $label))
    };
}

#[macro_export]
macro_rules! emit_info {
    (sty:$style:expr, msg:$msg:literal) => {
        tracing::info!("{}", $style.paint($msg));
    };
    (sty:$style:expr, fmt:$fmt:literal | $($rest:tt)+) => {
        tracing::info!("{}", $style.paint(format!($fmt, $($rest)*)));
    };
    (fmt:$fmt:literal | $($rest:tt)+) => {
        tracing::info!($fmt, $($rest)*);
    };
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("@({},{})", self.x, self.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{}{:?}", self.id.index(), self.point)
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S(V{}--V{})", self.a.index(), self.b.index())
    }
}

impl fmt::Debug for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T(V{}, V{}, V{})",
            self.a.index(),
            self.b.index(),
            self.c.index()
        )
    }
}

#[macro_export]
macro_rules! dbg_anchor {
    ($figure:expr, $anchor:expr) => {
        $crate::debug::debug_with($crate::debug::debug_anchor($figure, $anchor))
    };
}

pub fn debug_anchor<'a>(
    figure: &'a Figure,
    anchor: &'a Anchor,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + 'a {
    move |f| match anchor {
        Anchor::Vertex(id) => write!(
            f,
            "{}",
            STYLE_ITEM.underline().paint(format!("{:?}", figure[*id]))
        ),
        Anchor::Point(p) => write!(f, "{}", STYLE_ITEM.paint(format!("{:?}", p))),
    }
}

#[macro_export]
macro_rules! dbg_segment {
    ($figure:expr, $segment:expr) => {
        $crate::debug::debug_with($crate::debug::debug_segment($figure, $segment))
    };
}

pub fn debug_segment<'a>(
    figure: &'a Figure,
    segment: &'a Segment,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + 'a {
    move |f| {
        write!(
            f,
            "{}{:?} -> {:?}",
            STYLE_LABEL.paint("S:"),
            figure[segment.a],
            figure[segment.b]
        )
    }
}

#[macro_export]
macro_rules! dbg_triangle {
    ($figure:expr, $triangle:expr) => {
        $crate::debug::debug_with($crate::debug::debug_triangle($figure, $triangle))
    };
}

pub fn debug_triangle<'a>(
    figure: &'a Figure,
    triangle: &'a Triangle,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + 'a {
    move |f| {
        write!(
            f,
            "{}[{}]",
            STYLE_TYPE_NAME.paint("T"),
            triangle
                .vertices()
                .iter()
                .map(|&v| format!("{:?}", figure[v]))
                .join(", ")
        )
    }
}

macro_rules! dbg_field {
    ($formatter:expr, $field_id:literal, $data:expr) => {
        writeln!(
            $formatter,
            "\t{}: {:?}",
            STYLE_LABEL.paint($field_id),
            $data
        )
    };
}

#[macro_export]
macro_rules! dbg_figure {
    ($figure:expr) => {
        $crate::debug::debug_with($crate::debug::debug_figure($figure))
    };
}

pub fn debug_figure(
    figure: &Figure,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + '_ {
    move |f| {
        writeln!(f, "{}", STYLE_TYPE_NAME.paint("Figure {"))?;
        dbg_field!(f, "locked", figure.is_locked())?;
        dbg_field!(
            f,
            "vertices",
            debug_with(|f| {
                f.write_str(&format!(
                    "[{}]",
                    figure.iter_vertices().map(|v| format!("{:?}", v)).join(", ")
                ))
            })
        )?;
        dbg_field!(
            f,
            "segments",
            debug_with(|f| {
                f.write_str(&format!(
                    "[{}]",
                    figure
                        .iter_segments()
                        .map(|(id, s)| format!(
                            "{}{:?}",
                            Style::new().fg(COLOR_GREEN).paint(format!("{}:", id.index())),
                            s
                        ))
                        .join(", ")
                ))
            })
        )?;
        dbg_field!(f, "extended", figure.extended().len())?;
        write!(f, "{}", STYLE_TYPE_NAME.paint("}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_renders_compactly() {
        assert_eq!(format!("{:?}", Point::new(1.5, -2.0)), "@(1.5,-2)");
        assert_eq!(Point::new(0.0, 3.0).to_string(), "@(0,3)");
    }
}
