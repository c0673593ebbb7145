// src/services/document_service.rs

use genpdf::{elements, style, Alignment, Element};
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::quotation::Quotation;

#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub business_name: String,
    pub fonts_dir: String,
    pub terms_text: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            business_name: "Metales & Hierros".to_string(),
            fonts_dir: "./fonts".to_string(),
            terms_text:
                "Cotización válida por 30 días. Precios sujetos a cambios sin previo aviso. No incluye IVA."
                    .to_string(),
        }
    }
}

#[derive(Clone)]
pub struct DocumentService {
    settings: DocumentSettings,
}

impl DocumentService {
    pub fn new(settings: DocumentSettings) -> Self {
        Self { settings }
    }

    /// Genera el PDF de una cotización: encabezado, tabla de ítems,
    /// línea de instalación si la hay, totales y validez.
    pub fn generate_quotation_pdf(&self, quotation: &Quotation) -> Result<Vec<u8>, AppError> {
        // Carga la fuente desde la carpeta configurada.
        let font_family =
            genpdf::fonts::from_files(&self.settings.fonts_dir, "Roboto", None).map_err(|_| {
                AppError::FontNotFound(format!(
                    "Fuente no encontrada en la carpeta {}",
                    self.settings.fonts_dir
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Cotización {}", quotation.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- ENCABEZADO ---
        doc.push(
            elements::Paragraph::new(self.settings.business_name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("COTIZACIÓN {}", quotation.id))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Fecha: {}",
            quotation.date.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Válida hasta: {}",
            quotation.valid_until.format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(2));

        // --- TABLA DE ÍTEMS ---
        // Pesos de columnas: Producto (4), Cantidad (1), Unitario (2), Subtotal (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Producto").styled(bold))
            .element(elements::Paragraph::new("Cant.").styled(bold))
            .element(elements::Paragraph::new("Unitario").styled(bold))
            .element(elements::Paragraph::new("Subtotal").styled(bold))
            .push()
            .expect("Table error");

        for item in &quotation.items {
            table
                .row()
                .element(elements::Paragraph::new(item.name.clone()))
                .element(elements::Paragraph::new(format!("{}", item.quantity)))
                .element(elements::Paragraph::new(format_currency(item.unit_price)))
                .element(elements::Paragraph::new(format_currency(item.subtotal)))
                .push()
                .expect("Table row error");
        }

        if let Some(installation) = &quotation.installation {
            table
                .row()
                .element(elements::Paragraph::new(format!(
                    "Servicio de instalación ({} m)",
                    installation.linear_meters
                )))
                .element(elements::Paragraph::new(""))
                .element(elements::Paragraph::new(format_currency(
                    installation.price_per_meter,
                )))
                .element(elements::Paragraph::new(format_currency(
                    installation.subtotal,
                )))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTALES ---
        let mut subtotal_paragraph =
            elements::Paragraph::new(format!("Subtotal: {}", format_currency(quotation.subtotal)));
        subtotal_paragraph.set_alignment(Alignment::Right);
        doc.push(subtotal_paragraph);

        let mut total_paragraph =
            elements::Paragraph::new(format!("TOTAL: {}", format_currency(quotation.total)));
        total_paragraph.set_alignment(Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        // --- TÉRMINOS ---
        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(self.settings.terms_text.clone())
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}

// Formato local: $ sin decimales, como mostraba el sitio.
fn format_currency(amount: Decimal) -> String {
    format!("$ {}", amount.round_dp(0))
}
