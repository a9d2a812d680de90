//! Prompt templates sent to the language model.
//!
//! Prompts are written in Indonesian (except the description validator,
//! which must reason across languages) because the catalog serves an
//! Indonesian restaurant.

use super::DescriptionStyle;

fn ingredients_or(ingredients: &[String], placeholder: &str) -> String {
    if ingredients.is_empty() {
        placeholder.to_string()
    } else {
        ingredients.join(", ")
    }
}

pub fn description_prompt(
    name: &str,
    category: &str,
    ingredients: &[String],
    style: DescriptionStyle,
) -> String {
    let ingredients = ingredients_or(ingredients, "bahan berkualitas");
    let tone = style.tone();

    format!(
        r#"You are a professional Food Safety & Description Expert.

TASK: Validate if this is a REAL, CONSUMABLE food/beverage item. If YES, create a mouth-watering description.

INPUT:
Name: "{name}"
Category: "{category}"
Ingredients: "{ingredients}"

VALIDATION RULES (Universal):
1. Is this something humans normally EAT or DRINK? Check across all languages.
   - VALID: food, beverages, snacks from any culture.
   - INVALID: non-food items (furniture, electronics, vehicles, harmful substances).
2. Special cases:
   - "Blood Orange" is VALID (a fruit). "Monster Energy Drink" is VALID (a brand).
   - "Stone Pot Bibimbap" is VALID (a cooking method).
   - "Human" / "人肉" / "Manusia" is INVALID. "Plastic" / "塑料" / "Plastik" is INVALID.
   - "Poison" / "毒药" / "Racun" is INVALID.
   - A food filed under a drink category (or the reverse) is INVALID unless the ingredients clarify it.
3. If the ingredient list is empty or unclear: a recognizable food name is VALID, gibberish is INVALID.
4. If VALID, write a 2 sentence description in Indonesian, style: {tone}
5. If INVALID, write a 2 sentence reason in Indonesian, style: {tone}

OUTPUT MUST BE JSON:
{{"isValid": true, "description": "...", "detectedLanguage": "en/id/zh/etc"}}
OR
{{"isValid": false, "reason": "Specific reason why invalid"}}

JSON:"#
    )
}

pub fn calories_prompt(name: &str, category: Option<&str>, ingredients: &[String]) -> String {
    let ingredients = ingredients_or(ingredients, "tidak disebutkan");
    let category = category.unwrap_or("Umum");

    format!(
        r#"BERPERANLAH SEBAGAI: Ahli Gizi Klinis & Ilmuwan Pangan.

TUGAS: Estimasi total kalori (kkal) per 1 porsi standar restoran.

DATA INPUT:
- Nama Menu: "{name}"
- Kategori: "{category}"
- Komposisi/Bahan: "{ingredients}"

INSTRUKSI:
1. PEMERIKSAAN KEAMANAN: jika menu atau bahan mengandung benda yang tidak bisa dimakan (batu, besi, kaca, plastik, semen), vonis INVALID dengan 0 kalori. Nama kiasan dengan bahan makanan asli tetap VALID. Nama yang tidak jelas seperti "paket hemat" adalah INVALID.
2. NAMA KREATIF: jangan langsung menolak nama yang tidak umum. Lihat bahannya dan hitung dari bahan tersebut. Untuk nama umum gunakan resep standar restoran. Untuk input minim seperti "Ayam", asumsikan olahan terpopuler di Indonesia.
3. PERHITUNGAN: perhitungkan metode masak (goreng menyerap minyak, santan tinggi kalori) dan gula tersembunyi pada minuman. Porsi standar: makanan 250-350g, minuman 250-350ml, snack 100-150g.

FORMAT OUTPUT (WAJIB JSON MURNI TANPA MARKDOWN):
Jika VALID:
{{"calories": 450, "status": "VALID", "reasoning": "Analisis singkat berdasarkan bahan."}}
Jika TIDAK VALID:
{{"calories": 0, "status": "INVALID", "reasoning": "Alasan penolakan."}}

Analisis dan berikan output JSON sekarang:"#
    )
}

pub fn price_prompt(name: &str, category: Option<&str>, ingredients: &[String]) -> String {
    let ingredients = ingredients_or(ingredients, "Bahan standar umum");
    let category = category.unwrap_or("Umum");

    format!(
        r#"BERPERANLAH SEBAGAI: Senior F&B Consultant & Cost Controller di Indonesia.

TUGAS: Analisis kelayakan dan estimasi harga jual menu (Rupiah) untuk restoran kelas menengah.

DATA INPUT:
- Nama Menu: "{name}"
- Kategori: "{category}"
- Bahan Baku: "{ingredients}"

INSTRUKSI:
1. VALIDASI KETAT: jika nama menu acak, benda mati (batu, semen, besi), tidak jelas, atau mengandung bahan berbahaya, hentikan analisis dan tetapkan status INVALID.
2. HPP: identifikasi komponen biaya termahal (protein, produk susu, sayur, karbohidrat) dengan harga pasar Jakarta saat ini dan porsi standar restoran.
3. HARGA JUAL: HPP x 3 (food cost sekitar 33%). Bahan premium memakai margin lebih tipis, bahan murah margin lebih tebal.
4. PEMBULATAN: bulatkan ke kelipatan 1.000 atau 5.000 terdekat.

FORMAT OUTPUT (WAJIB JSON MURNI TANPA MARKDOWN):
Jika VALID:
{{"recommended_price": 25000, "currency": "IDR", "status": "VALID", "analysis": "Ringkasan perhitungan HPP dan margin."}}
Jika TIDAK VALID:
{{"recommended_price": 0, "currency": "IDR", "status": "INVALID", "analysis": "Alasan penolakan."}}

Analisis dan berikan output JSON sekarang:"#
    )
}
