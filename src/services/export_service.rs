use crate::error::Result;
use crate::models::application::ApplicationReportRow;
use crate::utils::time::to_rfc3339;
use rust_xlsxwriter::*;

pub const APPLICATION_REPORT_HEADER: [&str; 9] = [
    "Application ID",
    "Student Username",
    "Student Email",
    "Company",
    "Role",
    "Status",
    "Current Round",
    "Applied At",
    "Updated At",
];

pub struct ExportService;

impl ExportService {
    /// Wraps a value in double quotes, doubling any embedded quote.
    pub fn csv_field(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    fn report_cells(row: &ApplicationReportRow) -> [String; 9] {
        [
            row.id.to_string(),
            row.username.clone(),
            row.email.clone(),
            row.company.clone().unwrap_or_default(),
            row.role.clone().unwrap_or_default(),
            row.status.clone(),
            row.current_round.clone().unwrap_or_default(),
            to_rfc3339(row.application_date),
            to_rfc3339(row.updated_at),
        ]
    }

    /// Header plus one line per row, every field quoted, `\n` separated.
    pub fn render_applications_csv(rows: &[ApplicationReportRow]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(
            APPLICATION_REPORT_HEADER
                .iter()
                .map(|h| Self::csv_field(h))
                .collect::<Vec<_>>()
                .join(","),
        );
        for row in rows {
            lines.push(
                Self::report_cells(row)
                    .iter()
                    .map(|c| Self::csv_field(c))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        lines.join("\n")
    }

    /// Same columns as the CSV report, as a styled workbook.
    pub fn generate_applications_xlsx(rows: &[ApplicationReportRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Applications")?;

        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let alt_row_1 = Color::RGB(0xF8FAFC);
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0);

        let widths = [38.0, 20.0, 30.0, 25.0, 25.0, 22.0, 20.0, 28.0, 28.0];
        for (i, width) in widths.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (APPLICATION_REPORT_HEADER.len() - 1) as u16;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, last_col, "Applications Report", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross);
        let exported = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        worksheet.merge_range(
            1,
            0,
            1,
            last_col,
            &format!("Exported {}  •  {} applications", exported, rows.len()),
            &subtitle_format,
        )?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        worksheet.set_row_height(header_row, 26)?;
        for (i, name) in APPLICATION_REPORT_HEADER.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, report_row) in rows.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };
            let cell_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            for (col, value) in Self::report_cells(report_row).iter().enumerate() {
                worksheet.write_string_with_format(row, col as u16, value, &cell_fmt)?;
            }
        }

        worksheet.set_freeze_panes(3, 0)?;
        worksheet.autofilter(
            header_row,
            0,
            (data_start_row + rows.len() as u32).saturating_sub(1).max(header_row),
            last_col,
        )?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
