//! Spreadsheet fixtures shared by the integration tests

#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

pub const COMMUNITY_HEADERS: [&str; 8] = [
    "Comunidad/ Establecimiento",
    "Departamento\u{a0}",
    " Municipio ",
    "Nombre del técnico",
    "CUI del técnico",
    "Insumo",
    "CODIGO ESCOLAR",
    "Listado de Registro de capacitacion y asistencia Tecnica",
];

pub const BENEFICIARY_HEADERS: [&str; 8] = [
    "referencia",
    "PRIMER NOMBRE",
    "SEGUNDO NOMBRE",
    "TERCER NOMBRE",
    "PRIMER APELLIDO",
    "SEGUNDO APELLIDO",
    "APELLIDO CASADA",
    "CUI",
];

/// Write a single-sheet workbook of text cells.
pub fn write_rows(path: &Path, sheet: &str, rows: &[Vec<String>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Two communities: "Aldea W" (row 1) and "Aldea X" (row 2).
pub fn community_roster(dir: &Path) -> PathBuf {
    let path = dir.join("Comunidades.xlsx");
    write_rows(
        &path,
        "Hoja1",
        &[
            strings(&COMMUNITY_HEADERS),
            strings(&[
                "Aldea W",
                "Alta Verapaz",
                "Cobán",
                "Ana Pop",
                "1111111111111",
                "Semilla de frijol",
                "16-01-0001-43",
                "Registro 1",
            ]),
            strings(&[
                " Aldea X ",
                "Quiché",
                "Chichicastenango",
                "Luis Ixcoy",
                "2456789010101",
                "Semilla de maíz",
                "14-06-0002-43",
                "Registro 2",
            ]),
        ],
    );
    path
}

/// Thirteen rows: twelve for "aldea x" (mixed case and padding), one for "Aldea Y".
pub fn beneficiary_roster(dir: &Path) -> PathBuf {
    let path = dir.join("Beneficiarios.xlsx");
    let mut rows = vec![strings(&BENEFICIARY_HEADERS)];
    for i in 0..12 {
        let reference = if i % 2 == 0 { "  aldea x " } else { "ALDEA X" };
        rows.push(vec![
            reference.to_string(),
            format!("Nombre{}", i),
            String::new(),
            String::new(),
            "Tum".to_string(),
            if i == 0 { "Chávez".to_string() } else { String::new() },
            String::new(),
            format!("{}", 3000000000000u64 + i as u64),
        ]);
        if i == 5 {
            rows.push(strings(&["Aldea Y", "Otro", "", "", "Ajú", "", "", "999"]));
        }
    }
    write_rows(&path, "Hoja1", &rows);
    path
}

/// Beneficiary roster lacking the `SEGUNDO APELLIDO` column.
pub fn beneficiary_roster_missing_column(dir: &Path) -> PathBuf {
    let path = dir.join("BeneficiariosIncompleto.xlsx");
    let headers: Vec<String> = BENEFICIARY_HEADERS
        .iter()
        .filter(|h| **h != "SEGUNDO APELLIDO")
        .map(|h| h.to_string())
        .collect();
    write_rows(
        &path,
        "Hoja1",
        &[headers, strings(&["Aldea X", "Ana", "", "", "Tum", "", "1"])],
    );
    path
}

/// Template workbook with the sheets of the standard and simplified forms.
pub fn template(dir: &Path) -> PathBuf {
    let path = dir.join("FormatoPlanillas.xlsx");
    let mut workbook = Workbook::new();
    let plain = Format::new();

    for sheet in ["PLANILLAS", "ADICIONALPLA", "PLANILLASASIST"] {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        worksheet.write_string(0, 0, "MINISTERIO").unwrap();
        worksheet.write_string(10, 1, "NOMBRE").unwrap();
        worksheet.write_string(10, 3, "CUI").unwrap();
        // community label spans E9:G9
        worksheet.merge_range(8, 4, 8, 6, "", &plain).unwrap();
        worksheet.write_formula(29, 0, "=1+1").unwrap();
    }

    workbook.save(&path).unwrap();
    path
}
