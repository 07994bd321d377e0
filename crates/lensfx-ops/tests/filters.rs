//! Filter chains the way the demo driver runs them.

use approx::assert_abs_diff_eq;
use lensfx_core::Image;
use lensfx_lut::{lookup_image, Lut3D};
use lensfx_ops::kernel::names;
use lensfx_ops::{
    AntiFishEye, AreaAverage, ColorLookup, Filter, GaussianBlur, HighlightShadowAdjust,
    KernelArg, KernelLibrary, LensBlur, OpsError, Prism, SpinBlur, Vibrance,
};

/// 48x32 RGB scene: horizontal ramp in red, vertical in green, a bright dot.
fn scene() -> Image {
    let (w, h) = (48u32, 32u32);
    let mut img = Image::new(w, h, 3).unwrap();
    for y in 0..h {
        for x in 0..w {
            let v = [x as f32 / (w - 1) as f32, y as f32 / (h - 1) as f32, 0.3];
            img.set_pixel(x, y, &v).unwrap();
        }
    }
    img.set_pixel(24, 16, &[1.0, 1.0, 1.0]).unwrap();
    img
}

/// Focus mask: white (sharp) at the top fading to black at the bottom.
fn depth_mask(w: u32, h: u32) -> Image {
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |_| 1.0 - y as f32 / (h - 1) as f32))
        .collect();
    Image::from_data(w, h, 1, data).unwrap()
}

fn assert_rgba_finite(img: &Image) {
    assert_eq!(img.channels(), 4);
    assert!(img.data().iter().all(|v| v.is_finite()));
}

#[test]
fn prism_then_fisheye_keeps_extent() {
    let img = scene();
    let prism = Prism {
        input: Some(img.clone()),
        distortion: 0.1,
        iterations: 5.0,
        strength: 0.6,
        separation: 0.4,
    };
    let aberrated = prism.output_image().unwrap().unwrap();
    assert_rgba_finite(&aberrated);

    let fisheye = AntiFishEye { input: Some(aberrated), factor: 1.2 };
    let out = fisheye.output_image().unwrap().unwrap();
    assert_eq!(out.extent(), img.extent());
    assert_rgba_finite(&out);
}

#[test]
fn lens_blur_with_half_size_mask() {
    let img = scene();
    let blur = LensBlur {
        input: Some(img.clone()),
        mask: Some(depth_mask(24, 16)),
        radius: 5.0,
        brightness: 0.3,
        angle: 0.4,
    };
    let out = blur.output_image().unwrap().unwrap();
    assert_eq!(out.extent(), img.extent());
    assert_rgba_finite(&out);
    // Top rows are white in the mask and stay sharp
    assert_abs_diff_eq!(out.pixel(10, 0)[0], img.pixel(10, 0)[0], epsilon = 0.02);
    // The dot sits mid-frame, half out of focus, and gets spread
    assert!(out.pixel(24, 16)[2] < 0.9);
}

#[test]
fn lookup_image_and_cube_agree() {
    let grade = |[r, g, b]: [f32; 3]| [r * 0.9, g, (b + 0.1).min(1.0)];
    let cube = Lut3D::from_fn(16, grade);
    let table = lookup_image::to_image(&cube, 16).unwrap();

    let by_image = ColorLookup {
        input: Some(scene()),
        lookup_table: Some(table),
        ..Default::default()
    }
    .output_image()
    .unwrap()
    .unwrap();
    let by_cube = ColorLookup { input: Some(scene()), cube: Some(cube), ..Default::default() }
        .output_image()
        .unwrap()
        .unwrap();

    for (a, b) in by_image.data().iter().zip(by_cube.data()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-4);
    }
}

#[test]
fn demo_adjustments_run_on_rgb() {
    let img = scene();

    let blurred = GaussianBlur { input: Some(img.clone()), radius: 2.0 }
        .output_image()
        .unwrap()
        .unwrap();
    assert_eq!(blurred.channels(), 3);
    assert!(blurred.pixel(24, 16)[2] < 1.0);

    let hsa = HighlightShadowAdjust {
        input: Some(img.clone()),
        highlight_amount: 1.0,
        shadow_amount: 0.4,
        ..Default::default()
    }
    .output_image()
    .unwrap()
    .unwrap();
    assert!(hsa.pixel(5, 5)[1] >= img.pixel(5, 5)[1]);

    let vib = Vibrance { input: Some(img.clone()), ..Default::default() }.output_image().unwrap().unwrap();
    assert!(vib.data().iter().all(|v| (0.0..=1.0).contains(v)));

    let spin = SpinBlur { input: Some(img.clone()), ..Default::default() }.output_image().unwrap().unwrap();
    assert_rgba_finite(&spin);
}

#[test]
fn area_average_readback() {
    let avg = AreaAverage { input: Some(Image::filled(8, 8, &[0.2, 0.4, 0.6]).unwrap()), extent: None }
        .output_image()
        .unwrap()
        .unwrap();
    let px = avg.pixel_rgba(0, 0);
    assert_abs_diff_eq!(px[1], 0.4, epsilon = 1e-6);
    assert_eq!(px[3], 1.0);
}

#[test]
fn kernels_reject_bad_arguments() {
    let img = scene();
    let kernel = KernelLibrary::global().get(names::PRISM).unwrap();
    let err = kernel
        .apply(img.extent(), &[KernelArg::Image(&img), KernelArg::Float(1.0)])
        .unwrap_err();
    assert!(matches!(err, OpsError::KernelArgument { index: 1, .. }));

    let lookup = KernelLibrary::global().get(names::LOOKUP).unwrap();
    let err = lookup
        .apply(img.extent(), &[KernelArg::Image(&img), KernelArg::Float(1.0), KernelArg::Float(1.0)])
        .unwrap_err();
    assert!(matches!(err, OpsError::KernelArgument { kernel: "lookup", index: 1, .. }));
}
