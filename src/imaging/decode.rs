//! File decoding into `f64` arrays.
//!
//! TIFF files go through the `tiff` decoder so multi-page stacks keep every
//! page: a single page decodes to `(H, W)` or `(H, W, samples)`, a stack of
//! single-sample pages to `(pages, H, W)`. Other formats use `image` and
//! decode to `(H, W)` or `(H, W, C)`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Pixel};
use ndarray::{Array3, ArrayD, Axis, IxDyn};
use tiff::decoder::{Decoder, DecodingResult};

use super::ImagingError;

/// Decode the file at `path` into a 2-D or 3-D array of raw intensities.
pub fn decode_image(path: &Path) -> Result<ArrayD<f64>, ImagingError> {
    if is_tiff(path) {
        decode_tiff(path)
    } else {
        let image = image::open(path).map_err(|source| ImagingError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        dynamic_to_array(&image)
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

fn decode_tiff(path: &Path) -> Result<ArrayD<f64>, ImagingError> {
    let tiff_err = |source| ImagingError::Tiff {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| ImagingError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(tiff_err)?;
    let mut pages = Vec::new();
    loop {
        let (width, height) = decoder.dimensions().map_err(tiff_err)?;
        let samples = samples_to_f64(decoder.read_image().map_err(tiff_err)?)
            .ok_or_else(|| ImagingError::TiffSampleFormat(path.to_path_buf()))?;
        pages.push(page_to_array(width as usize, height as usize, samples)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(tiff_err)?;
    }
    stack_pages(pages)
}

fn page_to_array(width: usize, height: usize, samples: Vec<f64>) -> Result<Array3<f64>, ImagingError> {
    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(ImagingError::UnsupportedShape {
            shape: vec![height, width, samples.len()],
        });
    }
    let per_pixel = samples.len() / pixels;
    Ok(Array3::from_shape_vec((height, width, per_pixel), samples)?)
}

fn stack_pages(mut pages: Vec<Array3<f64>>) -> Result<ArrayD<f64>, ImagingError> {
    if pages.len() == 1 {
        let page = pages.remove(0).into_dyn();
        return squeeze_single_sample(page);
    }
    let first_shape = pages[0].shape().to_vec();
    let stackable = first_shape[2] == 1
        && pages
            .iter()
            .all(|page| page.shape() == first_shape.as_slice());
    if !stackable {
        let mut shape = vec![pages.len()];
        shape.extend(first_shape);
        return Err(ImagingError::UnsupportedShape { shape });
    }
    let planes: Vec<_> = pages.iter().map(|page| page.index_axis(Axis(2), 0)).collect();
    Ok(ndarray::stack(Axis(0), &planes)?.into_dyn())
}

fn squeeze_single_sample(array: ArrayD<f64>) -> Result<ArrayD<f64>, ImagingError> {
    if array.ndim() == 3 && array.shape()[2] == 1 {
        let (height, width) = (array.shape()[0], array.shape()[1]);
        return Ok(array.into_shape_with_order(IxDyn(&[height, width]))?);
    }
    Ok(array)
}

#[allow(unreachable_patterns)]
fn samples_to_f64(result: DecodingResult) -> Option<Vec<f64>> {
    Some(match result {
        DecodingResult::U8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F64(values) => values,
        _ => return None,
    })
}

fn dynamic_to_array(image: &DynamicImage) -> Result<ArrayD<f64>, ImagingError> {
    match image {
        DynamicImage::ImageLuma8(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageLumaA8(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgb8(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgba8(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageLuma16(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageLumaA16(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgb16(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgba16(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgb32F(buffer) => buffer_to_array(buffer),
        DynamicImage::ImageRgba32F(buffer) => buffer_to_array(buffer),
        other => buffer_to_array(&other.to_rgba32f()),
    }
}

fn buffer_to_array<P>(buffer: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<ArrayD<f64>, ImagingError>
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    let (width, height) = buffer.dimensions();
    let channels = usize::from(P::CHANNEL_COUNT);
    let samples: Vec<f64> = buffer.as_raw().iter().map(|&value| value.into()).collect();
    let shape = if channels == 1 {
        vec![height as usize, width as usize]
    } else {
        vec![height as usize, width as usize, channels]
    };
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), samples)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
    use std::io::BufWriter;
    use tempfile::tempdir;
    use tiff::encoder::{TiffEncoder, colortype};

    #[test]
    fn grayscale_png_decodes_to_two_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_fn(4, 3, |x, y| Luma([(x + 10 * y) as u8]))
            .save(&path)
            .unwrap();

        let array = decode_image(&path).unwrap();
        assert_eq!(array.shape(), &[3, 4]);
        assert_eq!(array[IxDyn(&[2, 1])], 21.0);
    }

    #[test]
    fn rgb_png_decodes_channels_last() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_fn(5, 4, |x, _| Rgb([x as u8, 100, 200]))
            .save(&path)
            .unwrap();

        let array = decode_image(&path).unwrap();
        assert_eq!(array.shape(), &[4, 5, 3]);
        assert_eq!(array[IxDyn(&[0, 3, 0])], 3.0);
        assert_eq!(array[IxDyn(&[1, 1, 2])], 200.0);
    }

    #[test]
    fn sixteen_bit_tiff_keeps_raw_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep.tiff");
        let image: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(3, 2, |x, y| Luma([1000 + (x + 3 * y) as u16]));
        image.save(&path).unwrap();

        let array = decode_image(&path).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array[IxDyn(&[1, 2])], 1005.0);
    }

    #[test]
    fn multi_page_tiff_stacks_pages_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stack.tiff");
        {
            let file = BufWriter::new(File::create(&path).unwrap());
            let mut encoder = TiffEncoder::new(file).unwrap();
            for page in 0..2u16 {
                let data: Vec<u16> = (0..6).map(|v| v + 100 * page).collect();
                encoder
                    .write_image::<colortype::Gray16>(3, 2, &data)
                    .unwrap();
            }
        }

        let array = decode_image(&path).unwrap();
        assert_eq!(array.shape(), &[2, 2, 3]);
        assert_eq!(array[IxDyn(&[0, 1, 2])], 5.0);
        assert_eq!(array[IxDyn(&[1, 0, 0])], 100.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = decode_image(&dir.path().join("absent.tiff")).unwrap_err();
        assert!(matches!(err, ImagingError::Open { .. }));
        let err = decode_image(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, ImagingError::Decode { .. }));
    }
}
