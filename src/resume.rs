//! Lexicographic positioning inside the search tree.
//!
//! A search path is the list of candidate indices chosen at each depth past the seeds. A
//! [`ResumeCursor`] holds one such path and tells the search which siblings to skip while
//! the live path still follows it.

use std::fmt;

/// What happens to siblings after the cursor position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CursorMode {
    /// Continue with the rest of the tree once the path is reached.
    #[default]
    Resume,
    /// Only explore the subtree below the path.
    Chunk,
}

/// Decision for one candidate of a node.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
    Skip,
    Explore,
    /// Leave the whole search.
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeCursor {
    path: Vec<usize>,
    mode: CursorMode,
}

impl ResumeCursor {
    pub fn new(path: Vec<usize>, mode: CursorMode) -> Self {
        Self { path, mode }
    }

    pub fn resume(path: Vec<usize>) -> Self {
        Self::new(path, CursorMode::Resume)
    }

    pub fn chunk(path: Vec<usize>) -> Self {
        Self::new(path, CursorMode::Chunk)
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether the cursor still constrains children of the node at `choices`.
    pub fn is_active(&self, choices: &[usize]) -> bool {
        choices.len() < self.path.len() && self.path.starts_with(choices)
    }

    /// Decides candidate `index` at the node reached by `choices`.
    pub fn decide(&self, choices: &[usize], index: usize) -> Step {
        if !self.is_active(choices) {
            return Step::Explore;
        }
        let target = self.path[choices.len()];
        if index < target {
            Step::Skip
        } else if index == target {
            Step::Explore
        } else {
            match self.mode {
                CursorMode::Resume => Step::Explore,
                CursorMode::Chunk => Step::Stop,
            }
        }
    }
}

impl fmt::Display for ResumeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            CursorMode::Resume => "resume",
            CursorMode::Chunk => "chunk",
        };
        write!(f, "{} {}", mode, format_path(&self.path))
    }
}

/// Renders a path as space separated indices, the format the command line accepts.
pub fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_empty_cursor_explores_everything() {
        let cursor = ResumeCursor::default();
        assert!(cursor.is_empty());
        for index in 0..5 {
            assert_eq!(cursor.decide(&[], index), Step::Explore);
            assert_eq!(cursor.decide(&[3, 1], index), Step::Explore);
        }
    }

    #[test]
    fn test_resume() {
        let cursor = ResumeCursor::resume(vec![2, 1]);
        assert_eq!(cursor.decide(&[], 0), Step::Skip);
        assert_eq!(cursor.decide(&[], 1), Step::Skip);
        assert_eq!(cursor.decide(&[], 2), Step::Explore);
        assert_eq!(cursor.decide(&[], 3), Step::Explore);

        assert_eq!(cursor.decide(&[2], 0), Step::Skip);
        assert_eq!(cursor.decide(&[2], 1), Step::Explore);
        assert_eq!(cursor.decide(&[2], 4), Step::Explore);

        // Off the path, and below the path: no constraint.
        assert_eq!(cursor.decide(&[3], 0), Step::Explore);
        assert_eq!(cursor.decide(&[2, 1], 0), Step::Explore);
    }

    #[test]
    fn test_chunk() {
        let cursor = ResumeCursor::chunk(vec![2, 1]);
        assert_eq!(cursor.decide(&[], 1), Step::Skip);
        assert_eq!(cursor.decide(&[], 2), Step::Explore);
        assert_eq!(cursor.decide(&[], 3), Step::Stop);
        assert_eq!(cursor.decide(&[2], 0), Step::Skip);
        assert_eq!(cursor.decide(&[2], 1), Step::Explore);
        assert_eq!(cursor.decide(&[2], 2), Step::Stop);
        assert_eq!(cursor.decide(&[2, 1], 7), Step::Explore);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResumeCursor::chunk(vec![0, 4, 2]).to_string(), "chunk 0 4 2");
        assert_eq!(format_path(&[]), "");
    }
}
