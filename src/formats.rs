//! Audio output formats the codec layer can produce

use log::debug;

/// Encoding name of MPEG-1 layer 3 audio
pub const MP3_ENCODING: &str = "MPEG1L3";
/// Encoding name of Ogg Vorbis audio
pub const VORBIS_ENCODING: &str = "VORBIS";

/// Shape of an audio stream; `None` fields match anything
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFormat {
    pub encoding: String,
    pub sample_rate: Option<f32>,
    pub sample_size_bits: Option<u16>,
    pub channels: u16,
    pub big_endian: bool,
}

impl AudioFormat {
    /// The 22.05 kHz 16-bit mono PCM format voices synthesize in
    pub fn voice_pcm() -> Self {
        Self {
            encoding: "PCM_SIGNED".to_string(),
            sample_rate: Some(22050.0),
            sample_size_bits: Some(16),
            channels: 1,
            big_endian: false,
        }
    }

    /// Mono output in the given encoding, rate and size left open
    pub fn encoded(encoding: &str) -> Self {
        Self {
            encoding: encoding.to_string(),
            sample_rate: None,
            sample_size_bits: None,
            channels: 1,
            big_endian: false,
        }
    }

    pub fn mp3() -> Self {
        Self::encoded(MP3_ENCODING)
    }

    pub fn ogg() -> Self {
        Self::encoded(VORBIS_ENCODING)
    }
}

/// The codec layer, as far as format discovery needs it
pub trait AudioCodecRegistry {
    /// Names of all known audio file types (e.g. `WAVE`, `MP3`)
    fn file_types(&self) -> Vec<String>;

    /// Whether a file type name maps to a usable type
    fn resolve_file_type(&self, name: &str) -> bool;

    /// Whether audio can be written as a file of this type
    fn is_file_type_supported(&self, name: &str) -> bool;

    /// Whether audio in `source` can be converted to `target`
    fn is_conversion_supported(&self, target: &AudioFormat, source: &AudioFormat) -> bool;
}

pub fn can_create_mp3(codecs: &dyn AudioCodecRegistry) -> bool {
    codecs.is_conversion_supported(&AudioFormat::mp3(), &AudioFormat::voice_pcm())
}

pub fn can_create_ogg(codecs: &dyn AudioCodecRegistry) -> bool {
    codecs.is_conversion_supported(&AudioFormat::ogg(), &AudioFormat::voice_pcm())
}

/// List producible audio types, one per line
///
/// Each supported type is listed as `NAME_FILE`; MP3 and Vorbis are also
/// listed as `NAME_STREAM` since they can be streamed. Empty when nothing
/// is available.
pub fn audio_file_format_types(codecs: &dyn AudioCodecRegistry) -> String {
    let mut output = String::new();

    for name in codecs.file_types() {
        let streamable = name == "MP3" || name == "Vorbis";
        let encodable = match name.as_str() {
            "MP3" => can_create_mp3(codecs),
            "Vorbis" => can_create_ogg(codecs),
            _ => true,
        };

        if encodable && codecs.resolve_file_type(&name) && codecs.is_file_type_supported(&name) {
            output.push_str(&name);
            output.push_str("_FILE\n");
            if streamable {
                output.push_str(&name);
                output.push_str("_STREAM\n");
            }
        } else {
            debug!("Audio type {} not available", name);
        }
    }

    output
}

/// Codec registry described by fixed tables
#[derive(Debug, Clone)]
pub struct StaticCodecRegistry {
    file_types: Vec<String>,
    encoders: Vec<String>,
}

impl StaticCodecRegistry {
    /// `file_types` can be written; `encoders` are the encodings PCM
    /// can be converted to
    pub fn new(file_types: &[&str], encoders: &[&str]) -> Self {
        Self {
            file_types: file_types.iter().map(|s| s.to_string()).collect(),
            encoders: encoders.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for StaticCodecRegistry {
    /// The uncompressed formats every build can write
    fn default() -> Self {
        Self::new(&["WAVE", "AU", "AIFF"], &[])
    }
}

impl AudioCodecRegistry for StaticCodecRegistry {
    fn file_types(&self) -> Vec<String> {
        self.file_types.clone()
    }

    fn resolve_file_type(&self, name: &str) -> bool {
        self.file_types.iter().any(|t| t == name)
    }

    fn is_file_type_supported(&self, name: &str) -> bool {
        self.resolve_file_type(name)
    }

    fn is_conversion_supported(&self, target: &AudioFormat, source: &AudioFormat) -> bool {
        source.encoding.starts_with("PCM") && self.encoders.iter().any(|e| *e == target.encoding)
    }
}
