//! Per-pixel kernels and the library that names them.
//!
//! A [`Kernel`] turns a list of [`KernelArg`]s into an RGBA image covering
//! a destination extent. Kernels are looked up by name from a
//! [`KernelLibrary`]; filters use the process-wide [`KernelLibrary::global`]
//! which is built on first access.
//!
//! # Example
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::kernel::{names, KernelArg, KernelLibrary};
//!
//! let input = Image::filled(8, 8, &[0.5, 0.25, 0.125, 1.0]).unwrap();
//! let kernel = KernelLibrary::global().get(names::ANTI_FISHEYE).unwrap();
//! let out = kernel
//!     .apply(
//!         input.extent(),
//!         &[KernelArg::Image(&input), KernelArg::Vec2([4.0, 4.0]), KernelArg::Float(0.0)],
//!     )
//!     .unwrap();
//! assert_eq!(out.extent(), input.extent());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use lensfx_core::{Image, Rect};
use lensfx_lut::Lut3D;
use tracing::debug;

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};

/// Registered kernel names.
pub mod names {
    /// Chromatic aberration.
    pub const PRISM: &str = "prism";
    /// Barrel distortion correction.
    pub const ANTI_FISHEYE: &str = "antiFishEye";
    /// Tiled color lookup.
    pub const LOOKUP: &str = "lookup";
    /// Bokeh pre pass: brightness power and circle of confusion.
    pub const BOKEH_PRE: &str = "hexagonalBokehBlurPre";
    /// Bokeh first ray pass.
    pub const BOKEH_VERTICAL: &str = "hexagonalBokehBlurAlphaVertical";
    /// Bokeh second ray pass.
    pub const BOKEH_DIAGONAL: &str = "hexagonalBokehBlurAlphaDiagonal";
    /// Bokeh combine pass.
    pub const BOKEH_BRAVO_CHARLIE: &str = "hexagonalBokehBlurBravoCharlie";

    /// Every built-in name.
    pub const ALL: [&str; 7] = [
        PRISM,
        ANTI_FISHEYE,
        LOOKUP,
        BOKEH_PRE,
        BOKEH_VERTICAL,
        BOKEH_DIAGONAL,
        BOKEH_BRAVO_CHARLIE,
    ];
}

/// A single kernel argument.
#[derive(Debug, Clone, Copy)]
pub enum KernelArg<'a> {
    /// Sampled image.
    Image(&'a Image),
    /// Scalar.
    Float(f32),
    /// Integer scalar.
    Int(i32),
    /// 2D vector.
    Vec2([f32; 2]),
    /// Flag.
    Bool(bool),
    /// 3D lookup table.
    Lut(&'a Lut3D),
}

impl KernelArg<'_> {
    /// Short name of the argument kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            KernelArg::Image(_) => "image",
            KernelArg::Float(_) => "float",
            KernelArg::Int(_) => "int",
            KernelArg::Vec2(_) => "vec2",
            KernelArg::Bool(_) => "bool",
            KernelArg::Lut(_) => "lut",
        }
    }
}

/// Typed view over a kernel's argument list.
pub(crate) struct Args<'s, 'a> {
    kernel: &'static str,
    args: &'s [KernelArg<'a>],
}

impl<'s, 'a> Args<'s, 'a> {
    pub(crate) fn new(kernel: &'static str, args: &'s [KernelArg<'a>]) -> Self {
        Self { kernel, args }
    }

    fn err(&self, index: usize, expected: &'static str) -> OpsError {
        OpsError::KernelArgument { kernel: self.kernel, index, expected }
    }

    pub(crate) fn get(&self, index: usize) -> OpsResult<KernelArg<'a>> {
        self.args.get(index).copied().ok_or_else(|| self.err(index, "present"))
    }

    pub(crate) fn image(&self, index: usize) -> OpsResult<&'a Image> {
        match self.args.get(index) {
            Some(KernelArg::Image(img)) => Ok(img),
            _ => Err(self.err(index, "an image")),
        }
    }

    /// Ints are accepted where a float is expected.
    pub(crate) fn float(&self, index: usize) -> OpsResult<f32> {
        match self.args.get(index) {
            Some(KernelArg::Float(v)) => Ok(*v),
            Some(KernelArg::Int(v)) => Ok(*v as f32),
            _ => Err(self.err(index, "a float")),
        }
    }

    pub(crate) fn int(&self, index: usize) -> OpsResult<i32> {
        match self.args.get(index) {
            Some(KernelArg::Int(v)) => Ok(*v),
            _ => Err(self.err(index, "an int")),
        }
    }

    pub(crate) fn vec2(&self, index: usize) -> OpsResult<[f32; 2]> {
        match self.args.get(index) {
            Some(KernelArg::Vec2(v)) => Ok(*v),
            _ => Err(self.err(index, "a vec2")),
        }
    }

    pub(crate) fn bool(&self, index: usize) -> OpsResult<bool> {
        match self.args.get(index) {
            Some(KernelArg::Bool(v)) => Ok(*v),
            Some(KernelArg::Int(v)) => Ok(*v != 0),
            _ => Err(self.err(index, "a bool")),
        }
    }
}

/// A named per-pixel program.
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Name the kernel is registered under.
    fn name(&self) -> &'static str;

    /// Region of input `input` needed to produce `rect` of the output.
    fn roi(&self, input: usize, rect: Rect) -> Rect {
        let _ = input;
        rect
    }

    /// Evaluates the kernel over `extent`, returning an RGBA image of the
    /// extent's size.
    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image>;
}

/// Evaluates `f` at the center of every pixel of `extent`.
///
/// `f` receives continuous pixel coordinates (`x + 0.5`, `y + 0.5`) in the
/// extent's coordinate space and returns RGBA.
pub(crate) fn render<F>(extent: Rect, f: F) -> OpsResult<Image>
where
    F: Fn(f32, f32) -> [f32; 4] + Sync + Send,
{
    if extent.is_empty() {
        return Err(OpsError::InvalidDimensions(format!("empty extent {extent}")));
    }
    let mut out = Image::new(extent.width, extent.height, 4)?;
    let width = extent.width as usize;
    let (ox, oy) = (extent.x as f32, extent.y as f32);

    for_each_row(out.data_mut(), width * 4, |y, row| {
        let py = oy + y as f32 + 0.5;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&f(ox + x as f32 + 0.5, py));
        }
    });
    Ok(out)
}

/// Kernels by name.
#[derive(Default)]
pub struct KernelLibrary {
    kernels: HashMap<&'static str, Arc<dyn Kernel>>,
}

impl fmt::Debug for KernelLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelLibrary").field("kernels", &self.names()).finish()
    }
}

impl KernelLibrary {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with every built-in kernel registered.
    pub fn builtin() -> Self {
        use crate::{anti_fisheye, color_lookup, lens_blur, prism};

        let mut lib = Self::new();
        lib.register(prism::PrismKernel);
        lib.register(anti_fisheye::AntiFishEyeKernel);
        lib.register(color_lookup::LookupKernel);
        lib.register(lens_blur::PreKernel);
        lib.register(lens_blur::AlphaVerticalKernel);
        lib.register(lens_blur::AlphaDiagonalKernel);
        lib.register(lens_blur::BravoCharlieKernel);
        lib
    }

    /// Process-wide library, built on first call.
    pub fn global() -> &'static KernelLibrary {
        static LIBRARY: OnceLock<KernelLibrary> = OnceLock::new();
        LIBRARY.get_or_init(|| {
            let lib = Self::builtin();
            debug!(kernels = lib.len(), "kernel library built");
            lib
        })
    }

    /// Adds a kernel, returning the one it replaced.
    pub fn register<K: Kernel + 'static>(&mut self, kernel: K) -> Option<Arc<dyn Kernel>> {
        self.kernels.insert(kernel.name(), Arc::new(kernel))
    }

    /// Looks up a kernel.
    pub fn get(&self, name: &str) -> OpsResult<Arc<dyn Kernel>> {
        self.kernels
            .get(name)
            .cloned()
            .ok_or_else(|| OpsError::KernelNotFound(name.to_string()))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.kernels.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.kernels.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Solid;

    impl Kernel for Solid {
        fn name(&self) -> &'static str {
            "solid"
        }

        fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
            let v = Args::new(self.name(), args).float(0)?;
            render(extent, |_, _| [v, v, v, 1.0])
        }
    }

    #[test]
    fn test_builtin_has_all_names() {
        let lib = KernelLibrary::builtin();
        assert_eq!(lib.len(), names::ALL.len());
        for name in names::ALL {
            assert!(lib.contains(name), "{name} missing");
            assert_eq!(lib.get(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_missing_kernel_is_error() {
        let err = KernelLibrary::global().get("noSuchKernel").unwrap_err();
        assert!(matches!(err, OpsError::KernelNotFound(n) if n == "noSuchKernel"));
    }

    #[test]
    fn test_register_and_replace() {
        let mut lib = KernelLibrary::new();
        assert!(lib.is_empty());
        assert!(lib.register(Solid).is_none());
        assert!(lib.register(Solid).is_some());
        assert_eq!(lib.names(), vec!["solid"]);
    }

    #[test]
    fn test_default_roi_is_identity() {
        let r = Rect::new(3, 4, 10, 20);
        assert_eq!(Solid.roi(0, r), r);
    }

    #[test]
    fn test_render_offset_extent() {
        let out = render(Rect::new(2, 1, 3, 2), |x, y| [x, y, 0.0, 1.0]).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (3, 2, 4));
        assert_eq!(out.pixel(0, 0), &[2.5, 1.5, 0.0, 1.0]);
        assert_eq!(out.pixel(2, 1), &[4.5, 2.5, 0.0, 1.0]);
    }

    #[test]
    fn test_render_empty_extent() {
        assert!(render(Rect::from_size(0, 4), |_, _| [0.0; 4]).is_err());
    }

    #[test]
    fn test_argument_type_errors() {
        let img = Image::new(1, 1, 4).unwrap();
        let args = [KernelArg::Image(&img), KernelArg::Int(3)];
        let a = Args::new("test", &args);
        assert!(a.image(0).is_ok());
        assert_eq!(a.float(1).unwrap(), 3.0);
        assert!(a.bool(1).unwrap());
        let err = a.vec2(1).unwrap_err();
        assert!(matches!(err, OpsError::KernelArgument { index: 1, expected: "a vec2", .. }));
        assert!(a.get(5).is_err());
        assert_eq!(a.get(1).unwrap().kind(), "int");
    }

    #[test]
    fn test_kernel_checks_args() {
        let err = Solid.apply(Rect::from_size(1, 1), &[]).unwrap_err();
        assert!(matches!(err, OpsError::KernelArgument { kernel: "solid", index: 0, .. }));
    }
}
