use crate::container::Container;
use camino::Utf8PathBuf;

/// Containers parsed from one host source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub path: Utf8PathBuf,
    pub containers: Vec<Container>,
}

impl Snapshot {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            containers: Vec::new(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }
}
