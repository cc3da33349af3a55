//! Exporter version.

/// The short version information for the exporter.
pub const FUSE_EXPORTER_SHORT_VERSION: &str = env!("FUSE_EXPORTER_SHORT_VERSION");

/// The long version information for the exporter.
pub const FUSE_EXPORTER_LONG_VERSION: &str = concat!(
    env!("FUSE_EXPORTER_LONG_VERSION_0"),
    "\n",
    env!("FUSE_EXPORTER_LONG_VERSION_1"),
    "\n",
    env!("FUSE_EXPORTER_LONG_VERSION_2"),
    "\n",
    env!("FUSE_EXPORTER_LONG_VERSION_3"),
    "\n",
    env!("FUSE_EXPORTER_LONG_VERSION_4")
);
