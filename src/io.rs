//! Read equations and write schematics and netlists to files

mod bench;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use bench::write_bench;

use crate::error::Result;
use crate::layout::Schematic;
use crate::Netlist;

/// Read a text file of equations, one per line
pub fn read_equation_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Write a schematic as pretty-printed JSON
pub fn write_schematic_json<W: Write>(w: &mut W, schematic: &Schematic) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, schematic)?;
    writeln!(w)?;
    Ok(())
}

/// Write a schematic to a JSON file
pub fn write_schematic_file(path: &Path, schematic: &Schematic) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_schematic_json(&mut w, schematic)?;
    w.flush()?;
    Ok(())
}

/// Write a netlist to a file
///
/// Following extensions are supported: .bench
pub fn write_netlist_file(path: &Path, net: &Netlist) -> Result<()> {
    match path.extension() {
        Some(s) if s == "bench" => {
            let mut w = BufWriter::new(File::create(path)?);
            write_bench(&mut w, net)?;
            w.flush()?;
            Ok(())
        }
        Some(s) => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unknown extension {}", s.to_string_lossy()),
        )
        .into()),
        None => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no extension given",
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{write_netlist_file, write_schematic_json};
    use crate::{generate, Error, GenerateConfig};

    #[test]
    fn test_json() {
        let s = generate("Y = A AND B", &GenerateConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_schematic_json(&mut buf, &s).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(v["nodes"][2]["kind"], "AND");
        assert_eq!(v["nodes"][3]["label"], "Y");
        assert_eq!(v["wires"][2]["to"], 3);
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_bad_extension() {
        let net = crate::Netlist::new();
        let res = write_netlist_file(Path::new("netlist.blif"), &net);
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
