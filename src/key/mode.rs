//! Unix-style mode bits stored in a key's access field.

/// File-type mask.
pub const TYPE_MASK: u32 = 0o170000;
/// Directory file type.
pub const TYPE_DIRECTORY: u32 = 0o040000;
/// Symbolic-link file type.
pub const TYPE_LINK: u32 = 0o120000;
/// Owner, group and other rwx bits.
pub const PERMISSION_BITS: u32 = 0o777;
pub const EXEC_BITS: u32 = 0o111;

pub fn is_directory(mode: u32) -> bool {
    mode & TYPE_MASK == TYPE_DIRECTORY
}

pub fn is_link(mode: u32) -> bool {
    mode & TYPE_MASK == TYPE_LINK
}
