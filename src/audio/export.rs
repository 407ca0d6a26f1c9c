// WAV export of rendered buffers

use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::audio::offline::{OfflineRenderer, RenderedBuffer};
use crate::error::EngineError;
use crate::project::Project;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub sample_rate: u32,
    /// 16 or 24; anything else falls back to 16.
    pub bit_depth: u16,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_depth: 16,
        }
    }
}

pub struct AudioExporter {
    settings: ExportSettings,
}

impl AudioExporter {
    pub fn new(settings: ExportSettings) -> Self {
        let mut settings = settings;
        if settings.bit_depth != 16 && settings.bit_depth != 24 {
            settings.bit_depth = 16;
        }
        Self { settings }
    }

    /// Render the project offline and write the result as a stereo WAV.
    pub fn export(&self, project: &Project, path: &Path) -> Result<RenderedBuffer, EngineError> {
        let buffer = OfflineRenderer::new(self.settings.sample_rate).render(project);
        self.write_wav(&buffer, path)?;
        Ok(buffer)
    }

    /// Write an already rendered buffer as a stereo WAV file.
    pub fn write_wav(&self, buffer: &RenderedBuffer, path: &Path) -> Result<(), EngineError> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: buffer.sample_rate,
            bits_per_sample: self.settings.bit_depth,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        match self.settings.bit_depth {
            24 => {
                let scale = ((1 << 23) - 1) as f32;
                for (l, r) in buffer.left.iter().zip(&buffer.right) {
                    writer.write_sample((l.clamp(-1.0, 1.0) * scale) as i32)?;
                    writer.write_sample((r.clamp(-1.0, 1.0) * scale) as i32)?;
                }
            }
            _ => {
                for sample in buffer.interleaved_i16() {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;

        log::info!(
            "exported {:.2}s to {}",
            buffer.duration_seconds(),
            path.display()
        );
        Ok(())
    }
}
