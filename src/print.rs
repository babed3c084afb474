//! Column formatting for decoded fonts.

use std::io::{self, Write};

use vero_sfnt::{
    endian::ByteOrder,
    tables::{DirectoryTable, FontHeader, Outlines, cmap::Cmap},
};

pub fn print_host_order(out: &mut impl Write, order: ByteOrder) -> io::Result<()> {
    writeln!(out, "Is {order}")
}

pub fn print_header(out: &mut impl Write, header: &FontHeader) -> io::Result<()> {
    if header.version.outlines() == Outlines::Cff {
        writeln!(out, "Contains CFF")?;
    }

    writeln!(
        out,
        "{:>10}{:>18}{:>13}{:>15}{:>13}",
        "Version", "Number of tables", "Search Range", "Entry Selector", "Range Shift"
    )?;
    writeln!(
        out,
        "{:>10}{:>18}{:>13}{:>15}{:>13}",
        "-------", "----------------", "------------", "--------------", "-----------"
    )?;
    writeln!(
        out,
        "{:>10}{:>18}{:>13}{:>15}{:>13}",
        format!("0x{:08X}", header.version.value()),
        header.num_tables,
        header.search_range,
        header.entry_selector,
        header.range_shift
    )
}

pub fn print_directory(out: &mut impl Write, directory: &DirectoryTable) -> io::Result<()> {
    writeln!(out, "{:>4}{:>12}{:>10}{:>10}", "Tag", "Checksum", "Offset", "Length")?;
    writeln!(out, "{:>4}{:>12}{:>10}{:>10}", "---", "--------", "------", "------")?;

    for entry in directory {
        writeln!(
            out,
            "{:>4}{:>12}{:>10}{:>10}",
            entry.tag,
            format!("0x{:08X}", entry.checksum),
            entry.offset,
            entry.length
        )?;
    }

    Ok(())
}

pub fn print_cmap(out: &mut impl Write, cmap: &Cmap) -> io::Result<()> {
    writeln!(
        out,
        "cmap version {}, {} encoding records",
        cmap.header.version, cmap.header.num_tables
    )?;
    writeln!(out, "{:>12}{:>13}{:>10}", "Platform id", "Encoding id", "Offset")?;
    writeln!(out, "{:>12}{:>13}{:>10}", "-----------", "-----------", "------")?;

    for record in &cmap.records {
        writeln!(
            out,
            "{:>12}{:>13}{:>10}   {:?}",
            record.platform_id,
            record.encoding_id,
            record.offset,
            record.platform()
        )?;
    }

    Ok(())
}
