//! Target systems: PLC system generation plus CPU architecture.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Module ids of the compact (SGC) family.
const SGC_MODULES: &[&str] = &[
    "X20CP0201",
    "X20CP0291",
    "X20CP0292",
    "X20XC0201",
    "X20XC0202",
    "X20XC0292",
];

/// Module ids of the legacy (SG3) family.
const SG3_MODULES: &[&str] = &[
    "CP360", "CP380", "CP382", "CP430", "CP474", "CP476", "CP770", "CP774",
];

/// ARM based SG4 modules are matched by this fragment or an `ARM` suffix.
const SG4_ARM_FRAGMENT: &str = "X20CP04";

/// System generation of a PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SystemGeneration {
    #[serde(rename = "SG4")]
    Sg4,
    #[serde(rename = "SGC")]
    Sgc,
    #[serde(rename = "SG3")]
    Sg3,
}

impl SystemGeneration {
    /// Sort priority, lower first. Legacy generations sort last.
    pub fn priority(self) -> u8 {
        match self {
            SystemGeneration::Sg4 => 0,
            SystemGeneration::Sgc => 1,
            SystemGeneration::Sg3 => 2,
        }
    }

    /// Preprocessor define announcing the generation to C code.
    pub fn define(self) -> &'static str {
        match self {
            SystemGeneration::Sg4 => "-D_SG4",
            SystemGeneration::Sgc => "-D_SGC",
            SystemGeneration::Sg3 => "-D_SG3",
        }
    }
}

impl fmt::Display for SystemGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemGeneration::Sg4 => "SG4",
            SystemGeneration::Sgc => "SGC",
            SystemGeneration::Sg3 => "SG3",
        };
        f.write_str(name)
    }
}

/// CPU architecture of a PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Architecture {
    #[serde(rename = "IA32")]
    Ia32,
    Arm,
    Arm64,
    M68k,
}

impl Architecture {
    /// Sort priority, lower first.
    pub fn priority(self) -> u8 {
        match self {
            Architecture::Ia32 => 0,
            Architecture::Arm => 1,
            Architecture::Arm64 => 2,
            Architecture::M68k => 3,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Architecture::Ia32 => "IA32",
            Architecture::Arm => "Arm",
            Architecture::Arm64 => "Arm64",
            Architecture::M68k => "M68k",
        };
        f.write_str(name)
    }
}

/// A system generation and architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TargetSystem {
    pub generation: SystemGeneration,
    pub architecture: Architecture,
}

impl TargetSystem {
    pub const fn new(generation: SystemGeneration, architecture: Architecture) -> Self {
        TargetSystem {
            generation,
            architecture,
        }
    }

    /// Derive the target system of a PLC module id.
    pub fn from_module_id(module_id: &str) -> Self {
        let id = module_id.trim().to_ascii_uppercase();

        if SGC_MODULES.contains(&id.as_str()) {
            TargetSystem::new(SystemGeneration::Sgc, Architecture::M68k)
        } else if SG3_MODULES.contains(&id.as_str()) {
            TargetSystem::new(SystemGeneration::Sg3, Architecture::M68k)
        } else if id.contains(SG4_ARM_FRAGMENT) || id.ends_with("ARM") {
            TargetSystem::new(SystemGeneration::Sg4, Architecture::Arm)
        } else {
            TargetSystem::new(SystemGeneration::Sg4, Architecture::Ia32)
        }
    }

    /// Target systems served by a gcc target machine (`i386-elf`, ...).
    ///
    /// `m68k-elf` serves both the SG3 and SGC generations.
    pub fn for_machine(machine: &str) -> Vec<TargetSystem> {
        use Architecture::*;
        use SystemGeneration::*;

        match machine.trim() {
            "i386-elf" | "i686-elf" => vec![TargetSystem::new(Sg4, Ia32)],
            "arm-elf" | "arm-eabi" => vec![TargetSystem::new(Sg4, Arm)],
            "aarch64-elf" => vec![TargetSystem::new(Sg4, Arm64)],
            "m68k-elf" => vec![TargetSystem::new(Sg3, M68k), TargetSystem::new(Sgc, M68k)],
            _ => Vec::new(),
        }
    }

    /// Compare by generation priority, then architecture priority.
    pub fn priority_cmp(&self, other: &TargetSystem) -> Ordering {
        self.generation
            .priority()
            .cmp(&other.generation.priority())
            .then(self.architecture.priority().cmp(&other.architecture.priority()))
    }
}

impl fmt::Display for TargetSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.generation, self.architecture)
    }
}
