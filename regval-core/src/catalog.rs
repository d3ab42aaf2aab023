//! Built-in regulator layouts (BACEN, CADOC, DIMP, DIRF).

use crate::layout::{FieldDefinition, FieldType, Layout, Validator};

fn integer(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Integer)
}

fn decimal(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Decimal)
}

fn text(name: &str, max_length: usize) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::String).with_max_length(max_length)
}

pub fn bacen() -> Validator {
    Validator::new(
        "bacen",
        "BACEN",
        Layout::new(
            "BACEN 3020",
            "1.0",
            vec![
                integer("codigo_registro"),
                text("cnpj_instituicao", 18),
                text("tipo_produto", 3),
                decimal("valor_transacao"),
                text("data_transacao", 8),
                integer("quantidade_transacoes"),
            ],
        ),
    )
}

pub fn cadoc_3040() -> Validator {
    Validator::new(
        "cadoc_3040",
        "CADOC 3040",
        Layout::new(
            "CADOC 3040",
            "1.0",
            vec![
                integer("tipo_registro"),
                text("cnpj_instituicao", 18),
                text("codigo_produto", 5),
                decimal("saldo_ativo"),
                decimal("saldo_passivo"),
                text("data_base", 8),
            ],
        ),
    )
}

pub fn cadoc_3050() -> Validator {
    Validator::new(
        "cadoc_3050",
        "CADOC 3050",
        Layout::new(
            "CADOC 3050",
            "1.0",
            vec![
                integer("tipo_registro"),
                text("cnpj_instituicao", 18),
                text("codigo_modalidade", 5),
                decimal("valor_exposicao"),
                integer("prazo_medio_dias"),
                decimal("indice_cobertura"),
            ],
        ),
    )
}

pub fn cadoc_6334() -> Validator {
    Validator::new(
        "cadoc_6334",
        "CADOC 6334",
        Layout::new(
            "CADOC 6334",
            "1.0",
            vec![
                integer("tipo_registro"),
                text("cnpj_participante", 18),
                text("codigo_servico", 6),
                integer("quantidade_operacoes"),
                decimal("valor_total"),
                text("canal_atendimento", 20).optional(),
                text("data_referencia", 8),
            ],
        ),
    )
}

pub fn dimp() -> Validator {
    Validator::new(
        "dimp",
        "DIMP",
        Layout::new(
            "DIMP TED/TEF",
            "1.0",
            vec![
                integer("codigo_registro"),
                text("cnpj_participante", 18),
                text("modalidade", 4),
                decimal("valor_total"),
                integer("quantidade_operacoes"),
                text("data_referencia", 8),
            ],
        ),
    )
}

pub fn dirf() -> Validator {
    Validator::new(
        "dirf",
        "DIRF",
        Layout::new(
            "DIRF Instituições Financeiras",
            "1.0",
            vec![
                integer("tipo_registro"),
                text("cnpj_fonte_pagadora", 18),
                text("cpf_beneficiario", 14).optional(),
                text("cnpj_beneficiario", 18).optional(),
                decimal("valor_rendimento"),
                decimal("imposto_retido"),
                integer("ano_calendario"),
            ],
        ),
    )
}

/// Every built-in validator, in catalog order.
pub fn builtin_validators() -> Vec<Validator> {
    vec![
        bacen(),
        cadoc_3040(),
        cadoc_3050(),
        cadoc_6334(),
        dimp(),
        dirf(),
    ]
}
