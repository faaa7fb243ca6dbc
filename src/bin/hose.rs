use anyhow::{bail, Result};
use hose_smiles::*;

fn main() -> Result<()> {
    init_logging(&std::env::var("HOSE_LOG").unwrap_or_else(|_| "info".to_string()));

    let mut dot = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dot" => dot = true,
            _ => positional.push(arg),
        }
    }

    let Some(hose_code) = positional.first() else {
        bail!("usage: hose [--dot] <HOSE_CODE> [NUCLEUS]");
    };
    let central = central_atom_from_nucleus(positional.get(1).map(String::as_str));

    if dot {
        println!("{}", HoseTree::parse(hose_code, central).to_dot());
    }
    let smiles = try_convert(hose_code, central)?;
    println!("{smiles}");
    Ok(())
}
