//! The eight target-language back-ends and the `Target` dispatch enum.

mod bash;
mod c;
mod csharp;
mod java;
mod javascript;
mod masm64;
mod powershell;
mod python;

pub use bash::BashBackend;
pub use c::CBackend;
pub use csharp::CSharpBackend;
pub use java::JavaBackend;
pub use javascript::JavaScriptBackend;
pub use masm64::Masm64Backend;
pub use powershell::PowerShellBackend;
pub use python::PythonBackend;

use clap::ValueEnum;
use rand::RngCore;

use super::Backend;

/// Target languages, with the equivalences spec.md §6 lists as CLI aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Bash,
    #[value(name = "c#", alias = "c_sharp", alias = "csharp")]
    CSharp,
    #[value(name = "c", alias = "cpp", alias = "c++")]
    C,
    #[value(alias = "js")]
    Javascript,
    Java,
    Masm64,
    #[value(alias = "ps")]
    Powershell,
    #[value(alias = "py")]
    Python,
}

/// Builds the back-end for `target`, seeded from `rng` for its identifier
/// generation. Each back-end uses its own draws from `rng`, independent of
/// whatever RNG the [`crate::core::engine::Engine`] that produced the
/// `Context` used.
pub fn for_target(target: Target, rng: Box<dyn RngCore>) -> Box<dyn Backend> {
    match target {
        Target::Bash => Box::new(BashBackend::new(rng)),
        Target::CSharp => Box::new(CSharpBackend::new(rng)),
        Target::C => Box::new(CBackend::new(rng)),
        Target::Javascript => Box::new(JavaScriptBackend::new(rng)),
        Target::Java => Box::new(JavaBackend::new(rng)),
        Target::Masm64 => Box::new(Masm64Backend::new(rng)),
        Target::Powershell => Box::new(PowerShellBackend::new(rng)),
        Target::Python => Box::new(PythonBackend::new(rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn resolves(alias: &str, target: Target) {
        assert_eq!(Target::from_str(alias, false), Ok(target), "alias {alias:?}");
    }

    #[test]
    fn canonical_names_resolve() {
        resolves("bash", Target::Bash);
        resolves("c#", Target::CSharp);
        resolves("c", Target::C);
        resolves("javascript", Target::Javascript);
        resolves("java", Target::Java);
        resolves("masm64", Target::Masm64);
        resolves("powershell", Target::Powershell);
        resolves("python", Target::Python);
    }

    #[test]
    fn csharp_aliases_resolve() {
        resolves("c_sharp", Target::CSharp);
        resolves("csharp", Target::CSharp);
    }

    #[test]
    fn c_aliases_resolve() {
        resolves("cpp", Target::C);
        resolves("c++", Target::C);
    }

    #[test]
    fn remaining_short_aliases_resolve() {
        resolves("js", Target::Javascript);
        resolves("ps", Target::Powershell);
        resolves("py", Target::Python);
    }

    #[test]
    fn unknown_target_name_is_rejected() {
        assert!(Target::from_str("fortran", false).is_err());
    }

    #[test]
    fn every_target_builds_a_backend_without_panicking() {
        for target in Target::value_variants() {
            let rng: Box<dyn RngCore> = Box::new(ChaCha8Rng::seed_from_u64(1));
            let _backend = for_target(*target, rng);
        }
    }
}
