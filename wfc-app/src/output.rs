use crate::visualization::{GridRenderer, Visualizer};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use wfc_core::PossibilityGrid;
use wfc_rules::Symbol;

/// Records every grid it is shown to a text file as numbered frames.
///
/// Each frame is its index on a line of its own followed by the rendered
/// grid. [`SnapshotWriter::restart`] sets the index back to zero, so a file
/// covering several attempts holds one run of frames per attempt.
pub struct SnapshotWriter<R> {
    path: PathBuf,
    renderer: R,
    writer: BufWriter<File>,
    frame: u64,
}

impl<R> SnapshotWriter<R> {
    /// Creates (or truncates) the snapshot file.
    pub fn create(path: &Path, renderer: R) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create snapshot file: {:?}", path))?;
        log::info!("Writing snapshots to {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            renderer,
            writer: BufWriter::new(file),
            frame: 0,
        })
    }

    /// Number of the next frame.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Starts numbering from zero again.
    pub fn restart(&mut self) {
        self.frame = 0;
    }

    /// Flushes buffered frames to disk.
    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush snapshot file: {:?}", self.path))
    }
}

impl<S, R> Visualizer<S> for SnapshotWriter<R>
where
    S: Symbol,
    R: GridRenderer<S>,
{
    fn display_state(&mut self, grid: &PossibilityGrid<S>) -> Result<()> {
        writeln!(self.writer, "{}", self.frame)
            .and_then(|()| write!(self.writer, "{}", self.renderer.render(grid)))
            .with_context(|| format!("Failed to write frame {} to {:?}", self.frame, self.path))?;
        self.frame += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::TerrainRenderer;
    use wfc_rules::Tile;

    #[test]
    fn test_frames_are_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.txt");
        let mut writer = SnapshotWriter::create(&path, TerrainRenderer::plain()).unwrap();

        let mut grid = PossibilityGrid::<Tile>::new(2, 1).unwrap();
        writer.display_state(&grid).unwrap();
        grid.get_mut(0, 0).unwrap().commit(Tile::Sand).unwrap();
        writer.display_state(&grid).unwrap();
        assert_eq!(writer.frame(), 2);
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0\nf f \n1\n..f \n");
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frames.txt");
        assert!(SnapshotWriter::create(&path, TerrainRenderer::plain()).is_err());
    }
}
