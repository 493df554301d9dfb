//! PDF serialization with `lopdf`.
//!
//! Fonts are the standard Type1 Helvetica pair with WinAnsi encoding, so no
//! font data is embedded. Content streams are left uncompressed; the logo
//! XObject is Flate-compressed RGB.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::LogoImage;
use super::layout::{Layout, PdfOp};
use super::metrics::encode_win_ansi;
use crate::error::BillsendError;

const REGULAR: &[u8] = b"F1";
const BOLD: &[u8] = b"F2";
const LOGO: &[u8] = b"Im1";

/// Serialize a layout into PDF bytes.
pub fn write_pdf(layout: &Layout, logo: Option<&LogoImage>, title: &str) -> Result<Vec<u8>, BillsendError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    };
    if let Some(logo) = logo {
        let image_id = add_logo(&mut doc, logo)?;
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content::<Vec<Operation>> {
            operations: page
                .ops
                .iter()
                .filter(|op| logo.is_some() || !matches!(op, PdfOp::Logo { .. }))
                .flat_map(operations)
                .collect(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), layout.page_width.into(), layout.page_height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("billsend"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_logo(doc: &mut Document, logo: &LogoImage) -> Result<ObjectId, BillsendError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&logo.rgb)?;
    let data = encoder.finish()?;
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => logo.width as i64,
            "Height" => logo.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        data,
    );
    Ok(doc.add_object(stream))
}

fn name(value: &[u8]) -> Object {
    Object::Name(value.to_vec())
}

fn operations(op: &PdfOp) -> Vec<Operation> {
    match op {
        PdfOp::Text {
            x,
            y,
            size,
            bold,
            color,
            text,
        } => {
            let font = if *bold { BOLD } else { REGULAR };
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![name(font), (*size).into()]),
                Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()]),
                Operation::new("Td", vec![(*x).into(), (*y).into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]
        }
        PdfOp::Rule {
            x1,
            x2,
            y,
            width,
            color,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new("RG", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new("w", vec![(*width).into()]),
            Operation::new("m", vec![(*x1).into(), (*y).into()]),
            Operation::new("l", vec![(*x2).into(), (*y).into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
        PdfOp::Logo {
            x,
            y,
            width,
            height,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (*width).into(),
                    0.into(),
                    0.into(),
                    (*height).into(),
                    (*x).into(),
                    (*y).into(),
                ],
            ),
            Operation::new("Do", vec![name(LOGO)]),
            Operation::new("Q", vec![]),
        ],
    }
}
