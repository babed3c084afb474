use std::fmt::{self, Debug, Display, Formatter};

/// A table identifier, e.g. `cmap`.
///
/// A tag is exactly four raw bytes. It is compared byte for byte and is never
/// byte swapped, whatever the host order is. The bytes are usually printable
/// ASCII but nothing here enforces that, since broken fonts exist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag::new(*b"cmap");

    /// Construct a `Tag` from raw bytes.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// The raw identifier bytes, exactly as they appear on disk.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0
    }

    /// The tag as text, with every byte outside printable ASCII
    /// replaced by `?`.
    pub fn to_lossy_string(self) -> String {
        self.0
            .iter()
            .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '?' })
            .collect()
    }
}

impl PartialEq<&[u8; 4]> for Tag {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_lossy_string())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.to_lossy_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_bytewise() {
        assert_eq!(Tag::new([0x63, 0x6D, 0x61, 0x70]), Tag::CMAP);
        assert_eq!(Tag::CMAP, b"cmap");
        assert_ne!(Tag::new(*b"pamc"), Tag::CMAP);
    }

    #[test]
    fn display_is_lossy_ascii() {
        assert_eq!(Tag::new(*b"OS/2").to_string(), "OS/2");
        assert_eq!(Tag::new([0x00, 0x01, 0x00, 0x00]).to_string(), "????");
        assert_eq!(format!("{:>6}", Tag::CMAP), "  cmap");
    }
}
