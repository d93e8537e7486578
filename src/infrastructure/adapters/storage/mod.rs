//! Storage Adapter - 文件系统音频缓存

mod file_audio_cache;

pub use file_audio_cache::FileAudioCache;
