/// The byte order of a machine or of an on-disk format.
///
/// Font files are always stored big-endian, so the only question worth asking
/// at runtime is whether the host matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Detects the byte order of the running machine by looking at how a
    /// known multi-byte constant is laid out in memory.
    pub fn host() -> Self {
        let probe = 0x0102_0304u32.to_ne_bytes();

        if probe[0] == 0x01 {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Turns bytes read verbatim from a big-endian source into the native
    /// layout of a host with this byte order.
    ///
    /// The bytes are reversed only when `self` is little-endian. Tags must never
    /// go through here, they are identifiers and not quantities.
    ///
    /// # Examples
    ///
    /// ```
    /// use vero_sfnt::endian::ByteOrder;
    ///
    /// let on_disk = [0x00, 0x01, 0x00, 0x00];
    /// assert_eq!(ByteOrder::Little.normalize(on_disk), [0x00, 0x00, 0x01, 0x00]);
    /// assert_eq!(ByteOrder::Big.normalize(on_disk), on_disk);
    /// ```
    pub fn normalize<const N: usize>(self, mut bytes: [u8; N]) -> [u8; N] {
        if self == Self::Little {
            bytes.reverse();
        }

        bytes
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Big => write!(f, "big endian"),
            Self::Little => write!(f, "little endian"),
        }
    }
}

macro_rules! impl_from_disk {
    ($fn_name:ident, $typ:ty) => {
        /// Interprets big-endian on-disk bytes as a native value, normalizing
        /// for the current host first.
        pub fn $fn_name(bytes: [u8; size_of::<$typ>()]) -> $typ {
            <$typ>::from_ne_bytes(ByteOrder::host().normalize(bytes))
        }
    };
}

impl_from_disk!(u16_from_disk, u16);
impl_from_disk!(u32_from_disk, u32);
