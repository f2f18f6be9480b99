//! Container format enumeration.

/// Supported workbook containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// Bare workbook XML document (.twb)
    Twb,
    /// Packaged workbook, a ZIP archive bundling a .twb with assets (.twbx)
    Twbx,
}

impl ContainerFormat {
    /// File extension (without the leading dot) for this container.
    #[inline]
    pub const fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Twb => "twb",
            ContainerFormat::Twbx => "twbx",
        }
    }

    /// Whether the container is a ZIP archive that must be unpacked first.
    #[inline]
    pub const fn is_packaged(&self) -> bool {
        matches!(self, ContainerFormat::Twbx)
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{}", self.extension())
    }
}
