//! The built-in cart patch for the wine catalog page.
//!
//! Three literal rules, applied in order:
//! 1. add the `CartIcon` and `addToCart` imports,
//! 2. replace the placeholder `agregarAlCarrito` handler with real cart logic,
//! 3. insert a floating `<CartIcon />` before the `<ChatBot />` widget.

use crate::config::schema::{Metadata, PatchConfig, Rule};

/// Target of the built-in patch, relative to the web project root.
pub const CATALOG_PAGE: &str = "src/pages/CatalogoVinos.tsx";

pub const OLD_IMPORTS: &str = r#"import React, { useState, useEffect, useMemo } from 'react';
import { Wine, MapPin, Filter, X, Search, ShoppingCart } from 'lucide-react';
import Navbar from '../components/Navbar';
import ChatBot from '../components/ChatBot';
import { supabase } from '../supabaseClient';
import { getCurrentUser } from '../auth';
import { isBirthday, applyBirthdayDiscount, getBirthdayDiscountAmount, BIRTHDAY_DISCOUNT_PERCENT } from '../utils/birthday';
import { getAllWines, Wine as Vino } from '../services/wineService';"#;

pub const NEW_IMPORTS: &str = r#"import React, { useState, useEffect, useMemo } from 'react';
import { Wine, MapPin, Filter, X, Search, ShoppingCart } from 'lucide-react';
import Navbar from '../components/Navbar';
import ChatBot from '../components/ChatBot';
import CartIcon from '../components/CartIcon';
import { supabase } from '../supabaseClient';
import { getCurrentUser } from '../auth';
import { isBirthday, applyBirthdayDiscount, getBirthdayDiscountAmount, BIRTHDAY_DISCOUNT_PERCENT } from '../utils/birthday';
import { getAllWines, Wine as Vino } from '../services/wineService';
import { addToCart } from '../utils/cartUtils';"#;

pub const OLD_ADD_TO_CART: &str = r#"  const agregarAlCarrito = (vino: Vino) => {
    // Aquí implementarías la lógica de agregar al carrito
    console.log('Agregado al carrito:', vino);
    alert(`${vino.nombre} agregado al carrito`);
  };"#;

pub const NEW_ADD_TO_CART: &str = r#"  const agregarAlCarrito = (vino: Vino) => {
    if (!vino.stock || vino.stock === 0) {
      alert('Este vino no tiene stock disponible')
      return
    }

    const success = addToCart({
      vino_id: vino.id,
      nombre: vino.nombre,
      precio: isBirthdayToday ? applyBirthdayDiscount(vino.precio) : vino.precio,
      imagen_url: vino.imagen_url,
      stock: vino.stock
    }, 1)

    if (success) {
      alert(`✅ ${vino.nombre} agregado al carrito`)
    }
  };"#;

pub const OLD_CHATBOT: &str = r#"      {/* ChatBot flotante */}
      <ChatBot />"#;

pub const NEW_CHATBOT: &str = r#"      {/* Ícono flotante del carrito */}
      <CartIcon />

      {/* ChatBot flotante */}
      <ChatBot />"#;

impl PatchConfig {
    /// The hard-coded catalog cart patch.
    pub fn builtin() -> Self {
        PatchConfig {
            meta: Metadata {
                name: "catalog-cart".to_string(),
                description: Some("Wire the catalog page to the shopping cart".to_string()),
                target: CATALOG_PAGE.to_string(),
            },
            rules: vec![
                Rule::new(
                    "imports",
                    "Imports agregados (CartIcon y addToCart)",
                    OLD_IMPORTS,
                    NEW_IMPORTS,
                ),
                Rule::new(
                    "add-to-cart",
                    "Función agregarAlCarrito implementada",
                    OLD_ADD_TO_CART,
                    NEW_ADD_TO_CART,
                ),
                Rule::new(
                    "cart-icon",
                    "CartIcon agregado antes de ChatBot",
                    OLD_CHATBOT,
                    NEW_CHATBOT,
                ),
            ],
        }
    }
}
