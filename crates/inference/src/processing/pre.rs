use super::ProcessingError;
use crate::config::DEFAULT_INPUT_SIZE;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::{Array, IxDyn};

/// Letterbox padding is black, matching the training-time transform.
const PAD_COLOR: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Rgb,
    Bgr,
}

/// Geometry of the resized content inside the padded canvas.
///
/// Postprocessing rescales boxes against the full canvas, not against
/// this content rectangle; the transform is returned for callers that
/// need the pre-pad geometry (see `PostProcessor::process`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub content_width: u32,
    pub content_height: u32,
}

pub struct PreProcessor {
    pub input_size: (u32, u32),
    rgb_buffer: Vec<u8>,
    padded_buffer: Vec<u8>,
}

impl PreProcessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            input_size,
            rgb_buffer: Vec::with_capacity(1920 * 1080 * 3),
            padded_buffer: vec![PAD_COLOR; (input_size.0 * input_size.1 * 3) as usize],
        }
    }

    /// Turn an interleaved 8-bit frame into a model-ready tensor.
    ///
    /// Aspect-preserving resize, centered zero padding to `input_size`,
    /// BGR→RGB swap when needed, `/255` scaling, CHW layout with a
    /// leading batch dimension of 1.
    pub fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: ColorFormat,
    ) -> Result<(Array<f32, IxDyn>, LetterboxTransform), ProcessingError> {
        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            ?format,
            "Preprocessing frame"
        );

        self.copy_rgb_pixels(pixels, width, height, format)?;

        let transform = self.resize_and_pad(width, height)?;

        let input = Self::normalize(&self.padded_buffer, self.input_size)?;

        Ok((input, transform))
    }

    fn copy_rgb_pixels(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: ColorFormat,
    ) -> Result<(), ProcessingError> {
        let expected = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected {
            return Err(ProcessingError::PixelBufferMismatch {
                expected,
                got: pixels.len(),
                width,
                height,
            });
        }

        self.rgb_buffer.clear();
        self.rgb_buffer.reserve(expected);
        match format {
            ColorFormat::Rgb => self.rgb_buffer.extend_from_slice(pixels),
            ColorFormat::Bgr => {
                for px in pixels.chunks_exact(3) {
                    self.rgb_buffer.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }

        Ok(())
    }

    fn resize_and_pad(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<LetterboxTransform, ProcessingError> {
        let (target_w, target_h) = self.input_size;

        let scale = (target_w as f32 / width as f32).min(target_h as f32 / height as f32);
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        let offset_x = (target_w - new_width) / 2;
        let offset_y = (target_h - new_height) / 2;

        let src = Image::from_slice_u8(width, height, &mut self.rgb_buffer, PixelType::U8x3)?;

        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        self.padded_buffer.fill(PAD_COLOR);

        let resized_data = resized.buffer();
        let stride = target_w * 3;

        for y in 0..new_height {
            let src_row = (y * new_width * 3) as usize;
            let dst_row = ((y + offset_y) * stride + offset_x * 3) as usize;

            self.padded_buffer[dst_row..dst_row + (new_width * 3) as usize]
                .copy_from_slice(&resized_data[src_row..src_row + (new_width * 3) as usize]);
        }

        Ok(LetterboxTransform {
            scale,
            offset_x,
            offset_y,
            content_width: new_width,
            content_height: new_height,
        })
    }

    fn normalize(
        padded: &[u8],
        (width, height): (u32, u32),
    ) -> Result<Array<f32, IxDyn>, ProcessingError> {
        let width = width as usize;
        let height = height as usize;
        let spatial = width * height;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in padded.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(
            IxDyn(&[1, 3, height, width]),
            output,
        )?)
    }
}

impl Default for PreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}
