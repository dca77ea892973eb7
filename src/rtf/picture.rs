//! Embedded pictures.
//!
//! Images are embedded as a hex dump inside `{\*\shppict{\pict ...}}`. The
//! format tag is taken from the byte signature, so the caller only has to
//! supply the bytes and the pixel size.

use super::block::BlockFrame;
use super::error::{RtfError, RtfResult};
use super::escape::hex_dump;
use super::types::Alignment;
use super::writer::RtfWriter;
use crate::common::unit::{pt_to_twip, px_to_pt};

/// Characters per line of the hex dump.
const HEX_LINE_WIDTH: usize = 128;

/// Size of the BITMAPFILEHEADER that precedes a DIB in a `.bmp` file.
const BMP_FILE_HEADER_LEN: usize = 14;

/// Size of the Aldus placeable header that precedes a Windows metafile.
const WMF_PLACEABLE_HEADER_LEN: usize = 22;

/// Image formats that can be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Enhanced Metafile
    Emf,
    /// Windows Metafile
    Wmf,
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// Device Independent Bitmap
    Dib,
    /// Unknown or unsupported format
    Unknown,
}

impl ImageType {
    /// Picture format control word.
    fn control_word(self) -> Option<&'static str> {
        match self {
            ImageType::Emf => Some("emfblip"),
            ImageType::Wmf => Some("wmetafile8"),
            ImageType::Png => Some("pngblip"),
            ImageType::Jpeg => Some("jpegblip"),
            ImageType::Dib => Some("dibitmap0"),
            ImageType::Unknown => None,
        }
    }
}

/// Detect the image type from its binary signature.
pub fn detect_image_type(data: &[u8]) -> ImageType {
    if data.starts_with(&[0xFF, 0xD8]) {
        return ImageType::Jpeg;
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return ImageType::Png;
    }
    // EMR_HEADER record with the " EMF" signature at offset 40
    if data.len() >= 44 && data[0..4] == [0x01, 0x00, 0x00, 0x00] && &data[40..44] == b" EMF" {
        return ImageType::Emf;
    }
    // Placeable metafile, or a bare METAHEADER (memory or disk metafile)
    if data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A])
        || data.starts_with(&[0x01, 0x00, 0x09, 0x00])
        || data.starts_with(&[0x02, 0x00, 0x09, 0x00])
    {
        return ImageType::Wmf;
    }
    // .bmp file, or a bare BITMAPINFOHEADER
    if data.starts_with(b"BM") || data.starts_with(&[0x28, 0x00, 0x00, 0x00]) {
        return ImageType::Dib;
    }
    ImageType::Unknown
}

/// An embedded image block.
#[derive(Debug, Clone)]
pub struct Image {
    kind: ImageType,
    data: Vec<u8>,
    width_px: u32,
    height_px: u32,
    /// Display size in points
    width: f32,
    height: f32,
    alignment: Alignment,
    start_new_page: bool,
    frame: BlockFrame,
}

impl Image {
    /// Create an image from encoded bytes and their pixel size.
    ///
    /// The display size defaults to the pixel size at 96 DPI.
    pub fn from_bytes(
        bytes: impl Into<Vec<u8>>,
        width_px: u32,
        height_px: u32,
    ) -> RtfResult<Self> {
        let data = bytes.into();
        let kind = detect_image_type(&data);
        if kind == ImageType::Unknown {
            return Err(RtfError::UnsupportedImage(
                "unrecognized image signature".into(),
            ));
        }
        if width_px == 0 || height_px == 0 {
            return Err(RtfError::UnsupportedImage(format!(
                "image has no area ({width_px}x{height_px} pixels)"
            )));
        }
        Ok(Self {
            kind,
            data,
            width_px,
            height_px,
            width: px_to_pt(width_px),
            height: px_to_pt(height_px),
            alignment: Alignment::default(),
            start_new_page: false,
            frame: BlockFrame::paragraph(),
        })
    }

    #[inline]
    pub fn kind(&self) -> ImageType {
        self.kind
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Display size in points.
    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Scale to `width` points, keeping the aspect ratio.
    pub fn set_width(&mut self, width: f32) -> &mut Self {
        self.height = width * self.height_px as f32 / self.width_px as f32;
        self.width = width;
        self
    }

    /// Display size in points, ignoring the aspect ratio.
    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    #[inline]
    pub fn start_new_page(&self) -> bool {
        self.start_new_page
    }

    pub fn set_start_new_page(&mut self, start: bool) -> &mut Self {
        self.start_new_page = start;
        self
    }

    pub fn set_frame(&mut self, frame: BlockFrame) -> &mut Self {
        self.frame = frame;
        self
    }

    /// Bytes as they go into the picture destination, without file headers
    /// the reader does not expect.
    fn payload(&self) -> &[u8] {
        match self.kind {
            ImageType::Dib if self.data.starts_with(b"BM") => {
                self.data.get(BMP_FILE_HEADER_LEN..).unwrap_or_default()
            },
            ImageType::Wmf if self.data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) => self
                .data
                .get(WMF_PLACEABLE_HEADER_LEN..)
                .unwrap_or_default(),
            _ => &self.data,
        }
    }

    pub(crate) fn write(&self, out: &mut RtfWriter, frame: Option<&BlockFrame>) {
        let frame = frame.unwrap_or(&self.frame);
        let Some(format_word) = self.kind.control_word() else {
            return;
        };
        out.raw(&frame.head);
        if self.start_new_page {
            out.control_word("pagebb", None);
        }
        out.control_word(self.alignment.paragraph_word(), None);
        out.open_group()
            .raw("\\*")
            .control_word("shppict", None)
            .open_group()
            .control_word("pict", None)
            .control_word(format_word, None)
            .control_word("picw", Some(self.width_px as i64))
            .control_word("pich", Some(self.height_px as i64))
            .control_word("picwgoal", Some(pt_to_twip(self.width) as i64))
            .control_word("pichgoal", Some(pt_to_twip(self.height) as i64))
            .newline()
            .raw(&hex_dump(self.payload(), HEX_LINE_WIDTH))
            .close_group()
            .close_group();
        out.raw(&frame.tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 10] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

    #[test]
    fn test_detect_png() {
        assert_eq!(detect_image_type(&PNG), ImageType::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageType::Jpeg);
    }

    #[test]
    fn test_detect_metafiles_and_bitmaps() {
        let mut emf = vec![0x01, 0x00, 0x00, 0x00];
        emf.resize(40, 0);
        emf.extend_from_slice(b" EMF");
        assert_eq!(detect_image_type(&emf), ImageType::Emf);
        assert_eq!(detect_image_type(&[0xD7, 0xCD, 0xC6, 0x9A, 0]), ImageType::Wmf);
        assert_eq!(detect_image_type(b"BM\x00\x00"), ImageType::Dib);
        assert_eq!(detect_image_type(b"GIF89a"), ImageType::Unknown);
        assert_eq!(detect_image_type(&[]), ImageType::Unknown);
    }

    #[test]
    fn test_unsupported_images() {
        assert!(matches!(
            Image::from_bytes(b"GIF89a".to_vec(), 10, 10),
            Err(RtfError::UnsupportedImage(_))
        ));
        assert!(Image::from_bytes(PNG.to_vec(), 0, 10).is_err());
    }

    #[test]
    fn test_size_defaults_and_aspect() {
        let mut image = Image::from_bytes(PNG.to_vec(), 200, 100).unwrap();
        assert_eq!(image.size(), (150.0, 75.0));
        image.set_width(300.0);
        assert_eq!(image.size(), (300.0, 150.0));
        image.set_size(10.0, 10.0);
        assert_eq!(image.size(), (10.0, 10.0));
    }

    #[test]
    fn test_render_picture() {
        let mut image = Image::from_bytes(PNG.to_vec(), 4, 2).unwrap();
        image.set_alignment(Alignment::Center);
        let mut out = RtfWriter::new();
        image.write(&mut out, None);
        assert_eq!(
            out.finish(),
            "{\\pard\\qc{\\*\\shppict{\\pict\\pngblip\\picw4\\pich2\\picwgoal60\\pichgoal30\r\n89504e470d0a1a0a0001}}\\par}"
        );
    }

    #[test]
    fn test_bmp_file_header_is_stripped() {
        let mut bmp = b"BM".to_vec();
        bmp.resize(BMP_FILE_HEADER_LEN, 0);
        bmp.extend_from_slice(&[0x28, 0x00, 0x00, 0x00]);
        let image = Image::from_bytes(bmp, 1, 1).unwrap();
        assert_eq!(image.payload(), &[0x28, 0x00, 0x00, 0x00]);
    }
}
