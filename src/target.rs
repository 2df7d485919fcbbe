use std::fmt;

use serde::{Deserialize, Serialize};

/// Output language of the generated source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C with architecture intrinsics.
    C,
    /// OpenCL C: built-in vector types, `vloadN`/`vstoreN`, `fma`.
    OpenCl,
    /// CUDA C++ device code.
    Cuda,
    /// Fortran 90+.
    Fortran,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::C,
        Language::OpenCl,
        Language::Cuda,
        Language::Fortran,
    ];

    /// Resolve a language by its CLI/config name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "c" => Some(Language::C),
            "cl" | "opencl" | "opencl-c" => Some(Language::OpenCl),
            "cuda" | "cu" => Some(Language::Cuda),
            "fortran" | "f90" => Some(Language::Fortran),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::OpenCl => "opencl",
            Language::Cuda => "cuda",
            Language::Fortran => "fortran",
        }
    }

    /// C, OpenCL C and CUDA share expression syntax.
    pub fn is_c_family(self) -> bool {
        !matches!(self, Language::Fortran)
    }

    /// Languages with a built-in ternary `fma(a, b, c)`.
    pub fn has_builtin_fma(self) -> bool {
        matches!(self, Language::OpenCl | Language::Cuda)
    }

    /// Text appended to every printed statement.
    pub fn statement_terminator(self) -> &'static str {
        if self.is_c_family() {
            ";"
        } else {
            ""
        }
    }

    /// File extension for generated sources.
    pub fn source_extension(self) -> &'static str {
        match self {
            Language::C => ".c",
            Language::OpenCl => ".cl",
            Language::Cuda => ".cu",
            Language::Fortran => ".f90",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::C => "C",
            Language::OpenCl => "OpenCL C",
            Language::Cuda => "CUDA",
            Language::Fortran => "Fortran",
        };
        f.write_str(name)
    }
}

/// Target processor family used for intrinsic selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// No vector extensions known.
    Generic,
    /// SSE / AVX / AVX-512.
    X86,
    /// NEON (AArch64).
    Arm,
    /// Kalray MPPA manycore accelerator.
    Mppa,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::Generic,
        Architecture::X86,
        Architecture::Arm,
        Architecture::Mppa,
    ];

    /// Resolve an architecture by its CLI/config name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "generic" | "none" => Some(Architecture::Generic),
            "x86" | "x86_64" | "x86-64" | "amd64" => Some(Architecture::X86),
            "arm" | "arm64" | "aarch64" | "neon" => Some(Architecture::Arm),
            "mppa" | "kalray" => Some(Architecture::Mppa),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Architecture::Generic => "generic",
            Architecture::X86 => "x86",
            Architecture::Arm => "arm",
            Architecture::Mppa => "mppa",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
