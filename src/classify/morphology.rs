use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Dilate with a `size`×`size` rectangular kernel anchored at its center.
///
/// A square kernel of radius r is a chessboard-distance dilation with k = r.
/// Pixels outside the image never contribute.
pub fn dilate(mask: &GrayImage, size: u32) -> GrayImage {
    let radius = (size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return mask.clone();
    }
    imageproc::morphology::dilate(mask, Norm::LInf, radius)
}
