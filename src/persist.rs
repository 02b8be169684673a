//! The `.ts` figure file.
//!
//! Layout, all big-endian:
//!
//! ```text
//! i32            vertex count
//! (f64, f64)*    vertex x, y in figure order
//! i32            segment count
//! (i32, i32)*    segment endpoints as vertex positions
//! ```

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::info;

use crate::{
    figure::{Figure, FigureErr},
    point::Point,
    tolerance::Tolerances,
};

pub const FILE_EXTENSION: &str = "ts";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Malformed {
    /// The data ended early.
    Truncated,
    NegativeCount,
    IndexOutOfRange { index: i32, len: usize },
    /// A segment whose two endpoints are the same vertex.
    DegenerateSegment { index: i32 },
    /// The figure is too large for 32-bit counts.
    CountOverflow,
}

fn write_count<W: Write>(out: &mut W, count: usize) -> Result<(), FigureErr> {
    let count = i32::try_from(count).map_err(|_| Malformed::CountOverflow)?;
    out.write_i32::<BigEndian>(count)?;
    Ok(())
}

fn read_count<R: Read>(input: &mut R) -> Result<usize, FigureErr> {
    let count = input.read_i32::<BigEndian>()?;
    usize::try_from(count).map_err(|_| Malformed::NegativeCount.into())
}

pub fn write_figure<W: Write>(figure: &Figure, out: &mut W) -> Result<(), FigureErr> {
    write_count(out, figure.len_vertices())?;
    for v in figure.iter_vertices() {
        out.write_f64::<BigEndian>(v.x())?;
        out.write_f64::<BigEndian>(v.y())?;
    }
    write_count(out, figure.len_segments())?;
    for (_, s) in figure.iter_segments() {
        for end in [s.a, s.b] {
            let index = i32::try_from(end.index()).map_err(|_| Malformed::CountOverflow)?;
            out.write_i32::<BigEndian>(index)?;
        }
    }
    Ok(())
}

/// Read a figure verbatim: no snapping, merging or splitting is applied, so
/// vertex positions and segment pairings come back exactly as written.
pub fn read_figure<R: Read>(
    input: &mut R,
    tolerances: Tolerances,
) -> Result<Figure, FigureErr> {
    let mut figure = Figure::new(tolerances);

    let n_vertices = read_count(input)?;
    let mut vertices = Vec::new();
    for _ in 0..n_vertices {
        let x = input.read_f64::<BigEndian>()?;
        let y = input.read_f64::<BigEndian>()?;
        vertices.push(figure.push_vertex(Point::new(x, y)));
    }

    let lookup = |index: i32| {
        usize::try_from(index)
            .ok()
            .and_then(|ix| vertices.get(ix).copied())
            .ok_or(Malformed::IndexOutOfRange {
                index,
                len: vertices.len(),
            })
    };

    let n_segments = read_count(input)?;
    for _ in 0..n_segments {
        let ia = input.read_i32::<BigEndian>()?;
        let ib = input.read_i32::<BigEndian>()?;
        let (a, b) = (lookup(ia)?, lookup(ib)?);
        if a == b {
            return Err(Malformed::DegenerateSegment { index: ia }.into());
        }
        figure.push_segment(a, b);
    }
    Ok(figure)
}

/// `path` with `.ts` appended unless it already ends in `.ts`. Any other
/// extension is kept in front of it.
pub fn with_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().map_or(false, |ext| ext == FILE_EXTENSION) {
        return path.to_path_buf();
    }
    let mut named = path.as_os_str().to_owned();
    named.push(".");
    named.push(FILE_EXTENSION);
    PathBuf::from(named)
}

pub fn save(figure: &Figure, path: impl AsRef<Path>) -> Result<PathBuf, FigureErr> {
    let path = with_extension(path);
    let mut out = BufWriter::new(File::create(&path)?);
    write_figure(figure, &mut out)?;
    out.flush()?;
    info!(
        "saved {} vertices and {} segments to {}",
        figure.len_vertices(),
        figure.len_segments(),
        path.display()
    );
    Ok(path)
}

pub fn load(path: impl AsRef<Path>, tolerances: Tolerances) -> Result<Figure, FigureErr> {
    let path = path.as_ref();
    let mut input = BufReader::new(File::open(path)?);
    let figure = read_figure(&mut input, tolerances)?;
    info!(
        "loaded {} vertices and {} segments from {}",
        figure.len_vertices(),
        figure.len_segments(),
        path.display()
    );
    Ok(figure)
}
