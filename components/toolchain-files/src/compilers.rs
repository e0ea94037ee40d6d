pub const DEFAULT_SOLC_VERSION: &str = "0.8.3";

/// Version, or version constraint such as `^0.5.0`, of a compiler.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CompilerSpec {
    pub version: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Compilers {
    pub solc: CompilerSpec,
}

impl Default for Compilers {
    fn default() -> Self {
        Compilers {
            solc: CompilerSpec {
                version: DEFAULT_SOLC_VERSION.to_string(),
            },
        }
    }
}
