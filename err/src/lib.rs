#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("name too long")]
    NameTooLong,
    #[error("name already exists")]
    NameExists,
    #[error("name not found")]
    NameNotFound,
    #[error("no free descriptor")]
    DescriptorsExhausted,
    #[error("no free block")]
    BlocksExhausted,
    #[error("directory is full")]
    DirectoryFull,
    #[error("no free open-file slot")]
    OftExhausted,
    #[error("invalid or unopened slot")]
    InvalidSlot,
    #[error("file is open")]
    FileOpen,
}

pub type Result<T> = core::result::Result<T, Error>;
